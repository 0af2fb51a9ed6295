use sqlx::{PgExecutor, PgPool};

use crate::config::SearchCase;
use crate::models::{Post, PostWithCategory};
use crate::pagination::PageParams;

pub const SORTABLE: &[&str] = &[
    "id",
    "title",
    "author",
    "category_id",
    "created_at",
    "updated_at",
];

const SELECT_WITH_CATEGORY: &str = "SELECT p.*,
        CASE WHEN c.id IS NULL THEN NULL
             ELSE json_build_object('id', c.id, 'name', c.name, 'slug', c.slug)
        END AS category
     FROM posts p
     LEFT JOIN categories c ON c.id = p.category_id";

pub struct ListFilter<'a> {
    pub search: Option<&'a str>,
    pub category_id: Option<i64>,
    pub case: SearchCase,
}

pub async fn create<'e, E: PgExecutor<'e>>(
    executor: E,
    title: &str,
    content: &str,
    author: &str,
    category_id: i64,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "INSERT INTO posts (title, content, author, category_id)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(title)
    .bind(content)
    .bind(author)
    .bind(category_id)
    .fetch_one(executor)
    .await
}

pub async fn find_with_category<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<PostWithCategory>, sqlx::Error> {
    sqlx::query_as::<_, PostWithCategory>(&format!(
        "{SELECT_WITH_CATEGORY} WHERE p.id = $1 AND p.deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_for_update<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "SELECT * FROM posts WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Write the fillable columns back. `updated_at` only moves when one of them changed.
pub async fn save<'e, E: PgExecutor<'e>>(executor: E, post: &Post) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "UPDATE posts SET title = $2, content = $3, author = $4, category_id = $5,
             updated_at = CASE
                 WHEN (title, content, author, category_id) IS DISTINCT FROM ($2, $3, $4, $5)
                 THEN now() ELSE updated_at
             END
         WHERE id = $1 RETURNING *",
    )
    .bind(post.id)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.author)
    .bind(post.category_id)
    .fetch_one(executor)
    .await
}

/// Mark a live post deleted. `None` if it does not exist or is already deleted.
pub async fn soft_delete<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "UPDATE posts SET deleted_at = now()
         WHERE id = $1 AND deleted_at IS NULL RETURNING *",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list(
    pool: &PgPool,
    filter: &ListFilter<'_>,
    page: &PageParams,
) -> Result<Vec<PostWithCategory>, sqlx::Error> {
    let like = filter.case.like_operator();
    sqlx::query_as::<_, PostWithCategory>(&format!(
        "{SELECT_WITH_CATEGORY}
         WHERE p.deleted_at IS NULL
           AND ($1::text IS NULL OR p.title {like} $1)
           AND ($2::bigint IS NULL OR p.category_id = $2)
         ORDER BY {order} LIMIT $3 OFFSET $4",
        order = page.order_by(Some("p")),
    ))
    .bind(super::filter_pattern(filter.search))
    .bind(filter.category_id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter<'_>) -> Result<i64, sqlx::Error> {
    let like = filter.case.like_operator();
    let row: (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM posts p
         WHERE p.deleted_at IS NULL
           AND ($1::text IS NULL OR p.title {like} $1)
           AND ($2::bigint IS NULL OR p.category_id = $2)"
    ))
    .bind(super::filter_pattern(filter.search))
    .bind(filter.category_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
