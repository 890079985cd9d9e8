// crates/backend-lib/src/handlers/mod.rs

//! HTTP handlers of the `/api/v1` routes.

pub mod index;
pub mod password_reset;
pub mod session_auth;
pub mod users;

use crate::error::AppError;

/// A form field that must be present and non-empty
pub(crate) fn required(value: Option<String>, missing: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(missing.to_string()))
}
