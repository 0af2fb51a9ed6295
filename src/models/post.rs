use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::types::Json;
use sqlx::PgConnection;

use crate::activity::entity::{expect_id, expect_string};
use crate::activity::{ActivityError, Entity, EntityType};
use crate::db;
use crate::models::CategorySummary;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A post together with the `{id, name, slug}` of its category.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PostWithCategory {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,
    pub category: Option<Json<CategorySummary>>,
}

#[async_trait]
impl Entity for Post {
    const TYPE: EntityType = EntityType::Post;

    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "title" => Some(json!(self.title)),
            "content" => Some(json!(self.content)),
            "author" => Some(json!(self.author)),
            "category_id" => Some(json!(self.category_id)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), ActivityError> {
        match name {
            "title" => self.title = expect_string(Self::TYPE, name, value)?,
            "content" => self.content = expect_string(Self::TYPE, name, value)?,
            "author" => self.author = expect_string(Self::TYPE, name, value)?,
            "category_id" => self.category_id = expect_id(Self::TYPE, name, &value)?,
            _ => return Err(ActivityError::not_fillable(Self::TYPE, name)),
        }
        Ok(())
    }

    async fn find_for_update(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        db::posts::find_for_update(conn, id).await
    }

    async fn save(&self, conn: &mut PgConnection) -> Result<Self, sqlx::Error> {
        db::posts::save(conn, self).await
    }
}
