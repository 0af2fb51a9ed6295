use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use sqlx::PgConnection;

use crate::activity::{self, Action, ChangedFields, EntityType};
use crate::actor::Actor;
use crate::db;
use crate::db::categories::UniqueColumn;
use crate::error::AppError;
use crate::models::Category;
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
}

#[derive(Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
    /// Outer `None`: not sent. `Some(None)`: clear it.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateCategory {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            validate::required("name", name, Some(MAX_STRING_LEN))?;
        }
        if let Some(slug) = &self.slug {
            validate::required("slug", slug, Some(MAX_STRING_LEN))?;
        }
        if let Some(Some(description)) = &self.description {
            validate::max_len("description", description, Some(MAX_STRING_LEN))?;
        }
        Ok(())
    }

    fn into_changes(self) -> Map<String, Value> {
        let mut changes = Map::new();
        if let Some(name) = self.name {
            changes.insert("name".to_string(), json!(name));
        }
        if let Some(slug) = self.slug {
            changes.insert("slug".to_string(), json!(slug));
        }
        if let Some(description) = self.description {
            changes.insert("description".to_string(), json!(description));
        }
        changes
    }
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Category>>, AppError> {
    let page = PageParams::new(
        params.page,
        params.limit,
        params.sort.as_deref(),
        params.direction.as_deref(),
        db::categories::SORTABLE,
    );
    let search = params.search.as_deref();
    let case = state.config.search_case;

    let categories = db::categories::list(&state.pool, search, case, &page).await?;
    let total = db::categories::count(&state.pool, search, case).await?;

    Ok(Json(Page::new(&page, total, categories)))
}

pub async fn create(
    actor: Actor,
    State(state): State<SharedState>,
    Json(req): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    validate::required("name", &req.name, Some(MAX_STRING_LEN))?;
    validate::required("slug", &req.slug, Some(MAX_STRING_LEN))?;
    if let Some(description) = &req.description {
        validate::max_len("description", description, Some(MAX_STRING_LEN))?;
    }

    let mut tx = state.pool.begin().await?;
    ensure_unique(&mut *tx, UniqueColumn::Name, &req.name, None).await?;
    ensure_unique(&mut *tx, UniqueColumn::Slug, &req.slug, None).await?;

    let category = db::categories::create(
        &mut *tx,
        &req.name,
        &req.slug,
        req.description.as_deref(),
    )
    .await
    .map_err(|e| validate::unique_violation(e, "The name or slug has already been taken."))?;

    activity::record_action(
        &mut *tx,
        Action::Create,
        EntityType::Category,
        category.id,
        actor.as_str(),
        &ChangedFields::new(),
    )
    .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    let category = db::categories::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    activity::record_action(
        &state.pool,
        Action::Read,
        EntityType::Category,
        category.id,
        actor.as_str(),
        &ChangedFields::new(),
    )
    .await?;

    Ok(Json(category))
}

pub async fn update(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCategory>,
) -> Result<Json<Value>, AppError> {
    req.validate()?;

    let mut tx = state.pool.begin().await?;

    let category = db::categories::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    if let Some(name) = &req.name {
        ensure_unique(&mut *tx, UniqueColumn::Name, name, Some(id)).await?;
    }
    if let Some(slug) = &req.slug {
        ensure_unique(&mut *tx, UniqueColumn::Slug, slug, Some(id)).await?;
    }

    let (category, _) =
        activity::update_logged(&mut *tx, category, req.into_changes(), actor.as_str())
            .await
            .map_err(|e| match e {
                activity::ActivityError::Database(db_err) => validate::unique_violation(
                    db_err,
                    "The name or slug has already been taken.",
                ),
                other => other.into(),
            })?;

    tx.commit().await?;

    Ok(Json(json!({
        "message": "Category updated successfully",
        "data": category,
    })))
}

pub async fn delete(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.pool.begin().await?;

    let category = db::categories::soft_delete(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    activity::record_action(
        &mut *tx,
        Action::Delete,
        EntityType::Category,
        category.id,
        actor.as_str(),
        &ChangedFields::new(),
    )
    .await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_unique(
    conn: &mut PgConnection,
    column: UniqueColumn,
    value: &str,
    except_id: Option<i64>,
) -> Result<(), AppError> {
    if db::categories::is_taken(conn, column, value, except_id).await? {
        Err(AppError::Validation(format!(
            "The {} has already been taken.",
            column.as_str()
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_null_clears_and_absent_skips() {
        let cleared: UpdateCategory = serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert_eq!(cleared.into_changes()["description"], Value::Null);

        let untouched: UpdateCategory = serde_json::from_value(json!({ "name": "Tech" })).unwrap();
        assert_eq!(untouched.description, None);
        let changes = untouched.into_changes();
        assert!(!changes.contains_key("description"));
        assert_eq!(changes["name"], json!("Tech"));
    }

    #[test]
    fn overlong_description_is_rejected() {
        let req: UpdateCategory =
            serde_json::from_value(json!({ "description": "x".repeat(256) })).unwrap();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }
}
