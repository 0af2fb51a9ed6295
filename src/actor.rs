use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::SharedState;

pub const ACTOR_HEADER: &str = "x-actor";
const MAX_ACTOR_LEN: usize = 255;

/// Free-text name recorded on activity log entries.
///
/// Comes from the `x-actor` header, or the configured default when the header
/// is absent or blank. It is not authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn resolve(header: Option<&str>, default: &str) -> Result<Self, AppError> {
        let name = header.map(str::trim).filter(|s| !s.is_empty());
        match name {
            Some(name) if name.chars().count() > MAX_ACTOR_LEN => Err(AppError::BadRequest(
                format!("{ACTOR_HEADER} must be at most {MAX_ACTOR_LEN} characters"),
            )),
            Some(name) => Ok(Actor(name.to_string())),
            None => Ok(Actor(default.to_string())),
        }
    }
}

impl FromRequestParts<SharedState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(ACTOR_HEADER) {
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| AppError::BadRequest(format!("Invalid {ACTOR_HEADER} header")))?,
            ),
            None => None,
        };
        Actor::resolve(header, &state.config.default_actor)
    }
}
