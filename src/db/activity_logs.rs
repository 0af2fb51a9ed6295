use sqlx::{PgExecutor, PgPool};

use crate::config::SearchCase;
use crate::models::ActivityLog;
use crate::pagination::PageParams;

pub const SORTABLE: &[&str] = &[
    "id",
    "action",
    "entity_type",
    "entity_id",
    "changed_fields",
    "actor",
    "created_at",
    "updated_at",
    "deleted_at",
];

/// Substring filters for listing; `None` or blank means "don't filter".
#[derive(Debug, Default)]
pub struct ListFilter<'a> {
    pub action: Option<&'a str>,
    pub entity_type: Option<&'a str>,
    pub actor: Option<&'a str>,
}

const FILTER_CLAUSE: &str = "deleted_at IS NULL
           AND ($1::text IS NULL OR action {like} $1)
           AND ($2::text IS NULL OR entity_type {like} $2)
           AND ($3::text IS NULL OR actor {like} $3)";

fn where_clause(case: SearchCase) -> String {
    FILTER_CLAUSE.replace("{like}", case.like_operator())
}

pub async fn create<'e, E: PgExecutor<'e>>(
    executor: E,
    action: &str,
    entity_type: &str,
    entity_id: i64,
    changed_fields: &serde_json::Value,
    actor: &str,
) -> Result<ActivityLog, sqlx::Error> {
    sqlx::query_as::<_, ActivityLog>(
        "INSERT INTO activity_logs (action, entity_type, entity_id, changed_fields, actor)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(changed_fields)
    .bind(actor)
    .fetch_one(executor)
    .await
}

/// Look up an entry that has not been soft-deleted.
pub async fn find_active<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<ActivityLog>, sqlx::Error> {
    sqlx::query_as::<_, ActivityLog>(
        "SELECT * FROM activity_logs WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Soft-delete an entry. Returns `false` if it was missing or already deleted.
/// Not exposed over HTTP.
pub async fn soft_delete<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE activity_logs SET deleted_at = now(), updated_at = now()
         WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list(
    pool: &PgPool,
    filter: &ListFilter<'_>,
    case: SearchCase,
    page: &PageParams,
) -> Result<Vec<ActivityLog>, sqlx::Error> {
    sqlx::query_as::<_, ActivityLog>(&format!(
        "SELECT * FROM activity_logs WHERE {where_clause}
         ORDER BY {order} LIMIT $4 OFFSET $5",
        where_clause = where_clause(case),
        order = page.order_by(None),
    ))
    .bind(super::filter_pattern(filter.action))
    .bind(super::filter_pattern(filter.entity_type))
    .bind(super::filter_pattern(filter.actor))
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .await
}

pub async fn count(
    pool: &PgPool,
    filter: &ListFilter<'_>,
    case: SearchCase,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM activity_logs WHERE {}",
        where_clause(case)
    ))
    .bind(super::filter_pattern(filter.action))
    .bind(super::filter_pattern(filter.entity_type))
    .bind(super::filter_pattern(filter.actor))
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn list_for_entity<'e, E: PgExecutor<'e>>(
    executor: E,
    entity_type: &str,
    entity_id: i64,
) -> Result<Vec<ActivityLog>, sqlx::Error> {
    sqlx::query_as::<_, ActivityLog>(
        "SELECT * FROM activity_logs
         WHERE entity_type = $1 AND entity_id = $2 AND deleted_at IS NULL
         ORDER BY id ASC",
    )
    .bind(entity_type)
    .bind(entity_id)
    .fetch_all(executor)
    .await
}
