use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::activity::{ActivityError, RevertFailed};

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Validation(String),
    Internal(String),
    Database(sqlx::Error),
    Revert(RevertFailed),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Validation(msg) => write!(f, "Unprocessable Entity: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Database(err) => write!(f, "Database Error: {err}"),
            AppError::Revert(err) => write!(f, "{err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Revert(err) => return revert_response(err),
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

/// Revert failures answer with `{message, error}`; missing log or entity is a 404.
fn revert_response(err: RevertFailed) -> Response {
    let (status, message) = match &err.cause {
        ActivityError::LogNotFound(_) => (StatusCode::NOT_FOUND, "Activity log not found"),
        ActivityError::EntityNotFound { .. } => (StatusCode::NOT_FOUND, "Entity not found"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Revert failed"),
    };

    let error = match &err.cause {
        ActivityError::Database(db_err) => {
            tracing::error!("Database error during revert: {db_err}");
            "Internal server error".to_string()
        }
        cause => cause.to_string(),
    };

    let body = json!({ "message": message, "error": error });
    (status, axum::Json(body)).into_response()
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<ActivityError> for AppError {
    fn from(err: ActivityError) -> Self {
        match err {
            ActivityError::Database(e) => AppError::Database(e),
            ActivityError::EntityNotFound { entity_type, .. } => {
                AppError::NotFound(format!("{entity_type} not found"))
            }
            invalid @ ActivityError::InvalidField { .. } => {
                AppError::Validation(invalid.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<RevertFailed> for AppError {
    fn from(err: RevertFailed) -> Self {
        AppError::Revert(err)
    }
}
