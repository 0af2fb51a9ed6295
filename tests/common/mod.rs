use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use blogadmin::config::{Config, SearchCase};

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Send a request, optionally as `actor`, and return (body, status).
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
        actor: Option<&str>,
    ) -> (Value, StatusCode) {
        let mut req = self.client.request(method, self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(actor) = actor {
            req = req.header("x-actor", actor);
        }
        let resp = req.send().await.expect("request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        self.send(reqwest::Method::GET, path, None, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        self.send(reqwest::Method::POST, path, Some(body), None).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        self.send(reqwest::Method::PUT, path, Some(body), None).await
    }

    pub async fn delete(&self, path: &str) -> (Value, StatusCode) {
        self.send(reqwest::Method::DELETE, path, None, None).await
    }

    /// Create a category, return the category JSON.
    pub async fn create_category(&self, name: &str, slug: &str) -> Value {
        let (body, status) = self
            .post("/api/category", &json!({ "name": name, "slug": slug }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create category failed: {body}");
        body
    }

    /// Create a post under `category_id`, return the post JSON.
    pub async fn create_post(&self, title: &str, category_id: i64) -> Value {
        let (body, status) = self
            .post(
                "/api/post",
                &json!({
                    "title": title,
                    "content": format!("Content of {title}"),
                    "author": "Jane Roe",
                    "category_id": category_id,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create post failed: {body}");
        body
    }

    /// Active log entries for one entity, oldest first.
    pub async fn logs_for(&self, entity_type: &str, entity_id: i64) -> Vec<blogadmin::models::ActivityLog> {
        blogadmin::db::activity_logs::list_for_entity(&self.pool, entity_type, entity_id)
            .await
            .expect("list logs failed")
    }
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(SearchCase::Insensitive).await
}

/// Like [`spawn_app`], with list filters matching in the given case mode.
pub async fn spawn_app_with(search_case: SearchCase) -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("blogadmin_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    // Connect to default postgres DB to create test DB
    let admin_url = admin_url(&base_url);

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    // Connect to test DB and run migrations
    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
        default_actor: "John Doe".to_string(),
        search_case,
    };

    let app = blogadmin::build_app(pool.clone(), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
