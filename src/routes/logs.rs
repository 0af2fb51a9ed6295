use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::activity;
use crate::db;
use crate::error::AppError;
use crate::models::ActivityLog;
use crate::pagination::{Page, PageParams};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub actor: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<ActivityLog>>, AppError> {
    let page = PageParams::new(
        params.page,
        params.limit,
        params.sort.as_deref(),
        params.direction.as_deref(),
        db::activity_logs::SORTABLE,
    );

    let entity_tag = params.entity_type.as_deref().map(type_tag);
    let filter = db::activity_logs::ListFilter {
        action: params.action.as_deref(),
        entity_type: entity_tag.as_deref(),
        actor: params.actor.as_deref(),
    };
    let case = state.config.search_case;

    let logs = db::activity_logs::list(&state.pool, &filter, case, &page).await?;
    let total = db::activity_logs::count(&state.pool, &filter, case).await?;

    Ok(Json(Page::new(&page, total, logs)))
}

pub async fn revert(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let entity = activity::revert_to_log_version(&state.pool, id).await?;

    Ok(Json(serde_json::json!({
        "message": "Successfully reverted to previous version",
        "data": entity,
    })))
}

/// `post` -> `Post`: query parameters use lower case, stored tags are capitalised.
fn type_tag(param: &str) -> String {
    let mut chars = param.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
