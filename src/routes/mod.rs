pub mod categories;
pub mod logs;
pub mod posts;
pub mod validate;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Posts
        .route("/api/post", get(posts::list).post(posts::create))
        .route(
            "/api/post/{id}",
            get(posts::get)
                .put(posts::update)
                .patch(posts::update)
                .delete(posts::delete),
        )
        // Categories
        .route(
            "/api/category",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/category/{id}",
            get(categories::get)
                .put(categories::update)
                .patch(categories::update)
                .delete(categories::delete),
        )
        // Activity logs
        .route("/api/logs", get(logs::list))
        .route("/api/logs/revert/{id}", post(logs::revert))
}
