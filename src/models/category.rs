use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgConnection;

use crate::activity::entity::{expect_nullable_string, expect_string};
use crate::activity::{ActivityError, Entity, EntityType};
use crate::db;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[async_trait]
impl Entity for Category {
    const TYPE: EntityType = EntityType::Category;

    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(json!(self.name)),
            "slug" => Some(json!(self.slug)),
            "description" => Some(json!(self.description)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), ActivityError> {
        match name {
            "name" => self.name = expect_string(Self::TYPE, name, value)?,
            "slug" => self.slug = expect_string(Self::TYPE, name, value)?,
            "description" => self.description = expect_nullable_string(Self::TYPE, name, value)?,
            _ => return Err(ActivityError::not_fillable(Self::TYPE, name)),
        }
        Ok(())
    }

    async fn find_for_update(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        db::categories::find_for_update(conn, id).await
    }

    async fn save(&self, conn: &mut PgConnection) -> Result<Self, sqlx::Error> {
        db::categories::save(conn, self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Category {
        let now = Utc::now();
        Category {
            id: 3,
            name: "Technology".to_string(),
            slug: "tech".to_string(),
            description: Some("Gadgets".to_string()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn description_can_be_cleared() {
        let mut category = sample();
        category.set_field("description", Value::Null).unwrap();
        assert_eq!(category.description, None);
        assert_eq!(category.field("description"), Some(Value::Null));
    }

    #[test]
    fn name_cannot_be_null() {
        let mut category = sample();
        assert!(category.set_field("name", Value::Null).is_err());
        assert_eq!(category.name, "Technology");
    }
}
