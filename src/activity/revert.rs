use serde_json::Value;
use sqlx::{PgConnection, PgPool};

use super::entity::{Entity, EntityType};
use super::{ActivityError, ChangedFields};
use crate::db;
use crate::models::{ActivityLog, Category, Post};

/// Any failure while reverting, with the underlying cause attached.
#[derive(Debug, thiserror::Error)]
#[error("Revert failed: {cause}")]
pub struct RevertFailed {
    #[source]
    pub cause: ActivityError,
}

impl RevertFailed {
    pub fn is_not_found(&self) -> bool {
        self.cause.is_not_found()
    }
}

impl From<ActivityError> for RevertFailed {
    fn from(cause: ActivityError) -> Self {
        RevertFailed { cause }
    }
}

/// Restore the entity referenced by log `log_id` to the entry's `before` values.
///
/// Fields not mentioned in the entry are left alone. An entry without changes
/// (CREATE, READ, DELETE) still rewrites the entity unchanged. Lookup, update
/// and save share one transaction, so a failure leaves nothing half-applied.
/// Returns the refreshed entity as JSON.
pub async fn revert_to_log_version(pool: &PgPool, log_id: i64) -> Result<Value, RevertFailed> {
    match revert(pool, log_id).await {
        Ok(entity) => Ok(entity),
        Err(cause) => {
            tracing::warn!(log_id, error = %cause, "revert failed");
            Err(RevertFailed { cause })
        }
    }
}

async fn revert(pool: &PgPool, log_id: i64) -> Result<Value, ActivityError> {
    let mut tx = pool.begin().await?;

    let entry = db::activity_logs::find_active(&mut *tx, log_id)
        .await?
        .ok_or(ActivityError::LogNotFound(log_id))?;

    let entity_type: EntityType = entry.entity_type.parse()?;

    let reverted = match entity_type {
        EntityType::Post => serde_json::to_value(apply_before::<Post>(&mut *tx, &entry).await?)?,
        EntityType::Category => {
            serde_json::to_value(apply_before::<Category>(&mut *tx, &entry).await?)?
        }
    };

    tx.commit().await?;

    tracing::info!(
        log_id,
        %entity_type,
        entity_id = entry.entity_id,
        "entity reverted"
    );

    Ok(reverted)
}

async fn apply_before<E: Entity>(
    conn: &mut PgConnection,
    entry: &ActivityLog,
) -> Result<E, ActivityError> {
    let mut entity = E::find_for_update(conn, entry.entity_id)
        .await?
        .ok_or(ActivityError::EntityNotFound {
            entity_type: E::TYPE,
            id: entry.entity_id,
        })?;

    restore(&mut entity, &entry.changes()?)?;

    Ok(entity.save(conn).await?)
}

/// Set every field named in `changes` to its `before` value.
pub fn restore<E: Entity>(entity: &mut E, changes: &ChangedFields) -> Result<(), ActivityError> {
    for (field, change) in changes {
        entity.set_field(field, change.before.clone())?;
    }
    Ok(())
}
