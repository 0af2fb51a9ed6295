use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sqlx::PgConnection;

use crate::activity::{self, Action, ChangedFields, EntityType};
use crate::actor::Actor;
use crate::db;
use crate::error::AppError;
use crate::models::{Post, PostWithCategory};
use crate::pagination::{Page, PageParams};
use crate::routes::validate::{self, MAX_STRING_LEN};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub search: Option<String>,
    pub category: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category_id: i64,
}

#[derive(Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<i64>,
}

impl UpdatePost {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            validate::required("title", title, Some(MAX_STRING_LEN))?;
        }
        if let Some(content) = &self.content {
            validate::required("content", content, None)?;
        }
        Ok(())
    }

    /// Fields present in the request, as `field -> new value`.
    fn into_changes(self) -> Map<String, Value> {
        let mut changes = Map::new();
        if let Some(title) = self.title {
            changes.insert("title".to_string(), json!(title));
        }
        if let Some(content) = self.content {
            changes.insert("content".to_string(), json!(content));
        }
        if let Some(category_id) = self.category_id {
            changes.insert("category_id".to_string(), json!(category_id));
        }
        changes
    }
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<PostWithCategory>>, AppError> {
    let page = PageParams::new(
        params.page,
        params.limit,
        params.sort.as_deref(),
        params.direction.as_deref(),
        db::posts::SORTABLE,
    );

    let filter = db::posts::ListFilter {
        search: params.search.as_deref(),
        category_id: params.category,
        case: state.config.search_case,
    };

    let posts = db::posts::list(&state.pool, &filter, &page).await?;
    let total = db::posts::count(&state.pool, &filter).await?;

    Ok(Json(Page::new(&page, total, posts)))
}

pub async fn create(
    actor: Actor,
    State(state): State<SharedState>,
    Json(req): Json<CreatePost>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    validate::required("title", &req.title, Some(MAX_STRING_LEN))?;
    validate::required("content", &req.content, None)?;
    validate::required("author", &req.author, Some(MAX_STRING_LEN))?;

    let mut tx = state.pool.begin().await?;
    ensure_category(&mut *tx, req.category_id).await?;

    let post = db::posts::create(
        &mut *tx,
        &req.title,
        &req.content,
        &req.author,
        req.category_id,
    )
    .await?;

    activity::record_action(
        &mut *tx,
        Action::Create,
        EntityType::Post,
        post.id,
        actor.as_str(),
        &ChangedFields::new(),
    )
    .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<PostWithCategory>, AppError> {
    let post = db::posts::find_with_category(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    activity::record_action(
        &state.pool,
        Action::Read,
        EntityType::Post,
        post.post.id,
        actor.as_str(),
        &ChangedFields::new(),
    )
    .await?;

    Ok(Json(post))
}

pub async fn update(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePost>,
) -> Result<Json<Value>, AppError> {
    req.validate()?;

    let mut tx = state.pool.begin().await?;

    let post = db::posts::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if let Some(category_id) = req.category_id {
        ensure_category(&mut *tx, category_id).await?;
    }

    let (post, _) =
        activity::update_logged(&mut *tx, post, req.into_changes(), actor.as_str()).await?;

    tx.commit().await?;

    Ok(Json(json!({
        "message": "Post updated successfully",
        "data": post,
    })))
}

pub async fn delete(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.pool.begin().await?;

    let post = db::posts::soft_delete(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    activity::record_action(
        &mut *tx,
        Action::Delete,
        EntityType::Post,
        post.id,
        actor.as_str(),
        &ChangedFields::new(),
    )
    .await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_category(conn: &mut PgConnection, category_id: i64) -> Result<(), AppError> {
    if db::categories::exists(conn, category_id).await? {
        Ok(())
    } else {
        Err(AppError::Validation(
            "The selected category id is invalid.".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_changes_only_include_present_fields() {
        let req = UpdatePost {
            title: Some("New Title".to_string()),
            content: None,
            category_id: Some(2),
        };
        let changes = req.into_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes["title"], json!("New Title"));
        assert_eq!(changes["category_id"], json!(2));
    }

    #[test]
    fn update_rejects_blank_title() {
        let req = UpdatePost {
            title: Some(" ".to_string()),
            content: None,
            category_id: None,
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }
}
