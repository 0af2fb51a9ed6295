use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgConnection;

use super::ActivityError;

/// Tag stored in `activity_logs.entity_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Post,
    Category,
}

impl EntityType {
    pub const ALL: [EntityType; 2] = [EntityType::Post, EntityType::Category];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Post => "Post",
            EntityType::Category => "Category",
        }
    }

    /// Fields that may be changed through the API, and therefore diffed and reverted.
    pub fn fillable(&self) -> &'static [&'static str] {
        match self {
            EntityType::Post => &["title", "content", "author", "category_id"],
            EntityType::Category => &["name", "slug", "description"],
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ActivityError::UnknownEntityType(s.to_string()))
    }
}

/// A loggable, revertible record addressed by `(TYPE, id)`.
#[async_trait]
pub trait Entity: Serialize + Send + Sync + Sized {
    const TYPE: EntityType;

    fn id(&self) -> i64;

    /// Current value of a fillable field, `None` for anything else.
    fn field(&self, name: &str) -> Option<Value>;

    /// Assign a fillable field from JSON. Leaves `self` unchanged on error.
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), ActivityError>;

    /// Load a live (not soft-deleted) row and lock it for the rest of the transaction.
    async fn find_for_update(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error>;

    /// Write all fillable fields back, returning the refreshed row.
    async fn save(&self, conn: &mut PgConnection) -> Result<Self, sqlx::Error>;
}

fn invalid(entity_type: EntityType, field: &str, reason: &str) -> ActivityError {
    ActivityError::InvalidField {
        entity_type,
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn expect_string(
    entity_type: EntityType,
    field: &str,
    value: Value,
) -> Result<String, ActivityError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(invalid(entity_type, field, "expected a string")),
    }
}

pub(crate) fn expect_nullable_string(
    entity_type: EntityType,
    field: &str,
    value: Value,
) -> Result<Option<String>, ActivityError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => Err(invalid(entity_type, field, "expected a string or null")),
    }
}

pub(crate) fn expect_id(
    entity_type: EntityType,
    field: &str,
    value: &Value,
) -> Result<i64, ActivityError> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| invalid(entity_type, field, "expected an integer id"))
}
