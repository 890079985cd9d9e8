// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sessiongate_common::{ErrorBody, ErrorDetail};
use thiserror::Error;

use crate::directory::DirectoryError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    /// No credential material at all
    #[error("Unauthorized")]
    Unauthorized,

    /// Credential material that did not resolve to a user
    #[error("Forbidden")]
    Forbidden,

    /// Login with a password that does not match
    #[error("wrong password")]
    WrongPassword,

    #[error("Not found")]
    NotFound,

    #[error("no user found for this email")]
    UnknownEmail,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::WrongPassword => StatusCode::UNAUTHORIZED,
            AppError::Forbidden
            | AppError::Directory(DirectoryError::NotFound | DirectoryError::InvalidResetToken) => {
                StatusCode::FORBIDDEN
            },
            AppError::NotFound | AppError::UnknownEmail => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::Directory(DirectoryError::DuplicateEmail) => {
                StatusCode::BAD_REQUEST
            },
            AppError::Internal(_) | AppError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "AUTH_001",
            AppError::Forbidden => "AUTH_002",
            AppError::WrongPassword => "AUTH_003",
            AppError::NotFound => "NF_001",
            AppError::UnknownEmail => "NF_002",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::Directory(DirectoryError::DuplicateEmail) => "VAL_002",
            AppError::Directory(DirectoryError::NotFound) => "AUTH_004",
            AppError::Directory(DirectoryError::InvalidResetToken) => "AUTH_005",
            AppError::Internal(_) => "INT_001",
            AppError::Directory(_) => "DIR_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            AppError::Directory(
                DirectoryError::DuplicateEmail
                | DirectoryError::NotFound
                | DirectoryError::InvalidResetToken,
            ) => self.to_string(),
            AppError::Directory(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
