use sqlx::{PgExecutor, PgPool};

use crate::config::SearchCase;
use crate::models::Category;
use crate::pagination::PageParams;

pub const SORTABLE: &[&str] = &["id", "name", "slug", "created_at", "updated_at"];

pub async fn create<'e, E: PgExecutor<'e>>(
    executor: E,
    name: &str,
    slug: &str,
    description: Option<&str>,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, slug, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(name)
    .bind(slug)
    .bind(description)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_for_update<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn exists<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1 AND deleted_at IS NULL)",
    )
    .bind(id)
    .fetch_one(executor)
    .await
}

/// Whether `column` = `value` is already used by a category other than `except_id`.
/// Soft-deleted rows still count, matching the table's unique constraints.
pub async fn is_taken<'e, E: PgExecutor<'e>>(
    executor: E,
    column: UniqueColumn,
    value: &str,
    except_id: Option<i64>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(&format!(
        "SELECT EXISTS (SELECT 1 FROM categories WHERE {} = $1 AND ($2::bigint IS NULL OR id <> $2))",
        column.as_str()
    ))
    .bind(value)
    .bind(except_id)
    .fetch_one(executor)
    .await
}

#[derive(Debug, Clone, Copy)]
pub enum UniqueColumn {
    Name,
    Slug,
}

impl UniqueColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueColumn::Name => "name",
            UniqueColumn::Slug => "slug",
        }
    }
}

/// Write the fillable columns back. `updated_at` only moves when one of them changed.
pub async fn save<'e, E: PgExecutor<'e>>(
    executor: E,
    category: &Category,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $2, slug = $3, description = $4,
             updated_at = CASE
                 WHEN (name, slug, description) IS DISTINCT FROM ($2, $3, $4)
                 THEN now() ELSE updated_at
             END
         WHERE id = $1 RETURNING *",
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .fetch_one(executor)
    .await
}

pub async fn soft_delete<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET deleted_at = now()
         WHERE id = $1 AND deleted_at IS NULL RETURNING *",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    case: SearchCase,
    page: &PageParams,
) -> Result<Vec<Category>, sqlx::Error> {
    let like = case.like_operator();
    sqlx::query_as::<_, Category>(&format!(
        "SELECT * FROM categories
         WHERE deleted_at IS NULL AND ($1::text IS NULL OR name {like} $1)
         ORDER BY {order} LIMIT $2 OFFSET $3",
        order = page.order_by(None),
    ))
    .bind(super::filter_pattern(search))
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .await
}

pub async fn count(
    pool: &PgPool,
    search: Option<&str>,
    case: SearchCase,
) -> Result<i64, sqlx::Error> {
    let like = case.like_operator();
    let row: (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM categories
         WHERE deleted_at IS NULL AND ($1::text IS NULL OR name {like} $1)"
    ))
    .bind(super::filter_pattern(search))
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
