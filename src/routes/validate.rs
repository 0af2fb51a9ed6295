use crate::error::AppError;

pub const MAX_STRING_LEN: usize = 255;

/// Non-blank, and at most `max` characters when a limit is given.
pub fn required(field: &str, value: &str, max: Option<usize>) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("The {field} field is required.")));
    }
    max_len(field, value, max)
}

pub fn max_len(field: &str, value: &str, max: Option<usize>) -> Result<(), AppError> {
    match max {
        Some(max) if value.chars().count() > max => Err(AppError::Validation(format!(
            "The {field} field must not be greater than {max} characters."
        ))),
        _ => Ok(()),
    }
}

/// Map a unique-constraint violation to a validation error; pass everything else through.
pub fn unique_violation(err: sqlx::Error, message: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Validation(message.to_string())
        }
        _ => AppError::Database(err),
    }
}
