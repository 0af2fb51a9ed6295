//! Activity logging and revert.
//!
//! Every entity-mutating handler records exactly one [`ActivityLog`] row per
//! action, in the same transaction as the mutation itself. Update entries
//! carry a `field -> {before, after}` diff which [`revert`] can later reapply.

pub mod diff;
pub mod entity;
pub mod revert;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgExecutor};

use crate::db;
use crate::models::ActivityLog;

pub use diff::{compute_diff, diff_entity, ChangedFields, FieldChange};
pub use entity::{Entity, EntityType};
pub use revert::{revert_to_log_version, RevertFailed};

#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    #[error("Unknown entity type '{0}'")]
    UnknownEntityType(String),
    #[error("Unknown action '{0}'")]
    UnknownAction(String),
    #[error("{entity_type} {id} not found")]
    EntityNotFound { entity_type: EntityType, id: i64 },
    #[error("Activity log {0} not found")]
    LogNotFound(i64),
    #[error("Invalid value for {entity_type}.{field}: {reason}")]
    InvalidField {
        entity_type: EntityType,
        field: String,
        reason: String,
    },
    #[error("Malformed changed_fields: {0}")]
    MalformedChanges(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ActivityError {
    pub(crate) fn not_fillable(entity_type: EntityType, field: &str) -> Self {
        ActivityError::InvalidField {
            entity_type,
            field: field.to_string(),
            reason: "not a fillable field".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ActivityError::LogNotFound(_) | ActivityError::EntityNotFound { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Ok(Action::Create),
            "READ" => Ok(Action::Read),
            "UPDATE" => Ok(Action::Update),
            "DELETE" => Ok(Action::Delete),
            _ => Err(ActivityError::UnknownAction(s.to_string())),
        }
    }
}

/// Persist one activity log entry and return it.
///
/// Store failures are returned to the caller; pass the caller's transaction as
/// `executor` to make the entry commit or roll back with the mutation.
pub async fn record_action<'e, E: PgExecutor<'e>>(
    executor: E,
    action: Action,
    entity_type: EntityType,
    entity_id: i64,
    actor: &str,
    changed_fields: &ChangedFields,
) -> Result<ActivityLog, ActivityError> {
    let changed = serde_json::to_value(changed_fields)?;

    let entry = db::activity_logs::create(
        executor,
        action.as_str(),
        entity_type.as_str(),
        entity_id,
        &changed,
        actor,
    )
    .await?;

    tracing::debug!(
        log_id = entry.id,
        %action,
        %entity_type,
        entity_id,
        fields = changed_fields.len(),
        "activity recorded"
    );

    Ok(entry)
}

/// Apply `proposed` to a locked `entity`, save it and log the resulting diff.
///
/// The diff is taken before any field is assigned, so `before` is the row as
/// it was read. Exactly one UPDATE entry is written, even when nothing changed.
pub async fn update_logged<E: Entity>(
    conn: &mut PgConnection,
    mut entity: E,
    proposed: Map<String, Value>,
    actor: &str,
) -> Result<(E, ActivityLog), ActivityError> {
    let changed = diff_entity(&entity, &proposed);

    for (field, value) in proposed {
        entity.set_field(&field, value)?;
    }

    let saved = entity.save(&mut *conn).await?;
    let entry = record_action(
        &mut *conn,
        Action::Update,
        E::TYPE,
        saved.id(),
        actor,
        &changed,
    )
    .await?;

    Ok((saved, entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parses_known_tags_case_insensitively() {
        assert_eq!("UPDATE".parse::<Action>().unwrap(), Action::Update);
        assert_eq!("delete".parse::<Action>().unwrap(), Action::Delete);
    }

    #[test]
    fn action_rejects_unknown_tags() {
        let err = "PUBLISH".parse::<Action>().unwrap_err();
        assert!(matches!(err, ActivityError::UnknownAction(ref tag) if tag == "PUBLISH"));
    }

    #[test]
    fn action_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Action::Read).unwrap(), "READ");
        assert_eq!(Action::Create.to_string(), "CREATE");
    }

    #[test]
    fn not_found_classification() {
        assert!(ActivityError::LogNotFound(1).is_not_found());
        assert!(ActivityError::EntityNotFound {
            entity_type: EntityType::Post,
            id: 1
        }
        .is_not_found());
        assert!(!ActivityError::UnknownEntityType("User".into()).is_not_found());
        assert!(!ActivityError::MalformedChanges("x".into()).is_not_found());
    }
}
