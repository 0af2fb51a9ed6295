use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityError, ChangedFields};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i64,
    /// Raw JSON as stored; see [`ActivityLog::changes`] for the typed view.
    pub changed_fields: serde_json::Value,
    pub actor: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ActivityLog {
    /// Decode `changed_fields` into `field -> {before, after}`.
    pub fn changes(&self) -> Result<ChangedFields, ActivityError> {
        serde_json::from_value(self.changed_fields.clone())
            .map_err(|e| ActivityError::MalformedChanges(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entry(changed_fields: serde_json::Value) -> ActivityLog {
        let now = Utc::now();
        ActivityLog {
            id: 1,
            action: "UPDATE".to_string(),
            entity_type: "Post".to_string(),
            entity_id: 1,
            changed_fields,
            actor: "John Doe".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn decodes_before_and_after() {
        let log = entry(json!({ "title": { "before": "A", "after": "B" } }));
        let changes = log.changes().unwrap();
        assert_eq!(changes["title"].before, json!("A"));
        assert_eq!(changes["title"].after, json!("B"));
    }

    #[test]
    fn empty_object_is_no_changes() {
        assert!(entry(json!({})).changes().unwrap().is_empty());
    }

    #[test]
    fn null_and_flat_values_are_malformed() {
        for raw in [json!(null), json!([]), json!({ "title": "B" })] {
            let err = entry(raw).changes().unwrap_err();
            assert!(matches!(err, ActivityError::MalformedChanges(_)));
        }
    }
}
