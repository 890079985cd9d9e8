// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! exchanged between `sessiongate` clients and the API server.
//! This module defines the JSON request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

/// Public JSON view of a user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserJson {
    /// Stable user identifier
    pub id: String,
    /// Email address, the identifying attribute
    pub email: String,
    /// Given name
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub first_name: Option<String>,
    /// Family name
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_name: Option<String>,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    /// RFC 3339 last update timestamp
    pub updated_at: String,
}

/// Form fields posted to the session login endpoint
/// # Fields
/// * `email` - Email of the user logging in
/// * `password` - Clear-text password
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of a user creation request
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NewUser {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Form posted to request a password reset token
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ResetTokenForm {
    pub email: Option<String>,
}

/// Reset token issued for `email`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResetTokenResponse {
    pub email: String,
    pub reset_token: String,
}

/// Form posted to set a new password with a reset token
/// # Fields
/// * `email` - Email of the user
/// * `reset_token` - Token issued by the reset request
/// * `new_password` - Clear-text replacement password
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub email: Option<String>,
    pub reset_token: Option<String>,
    pub new_password: Option<String>,
}

/// Acknowledgement carrying the affected email
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub email: String,
    pub message: String,
}

/// Response of the profile endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub email: String,
}

/// Response of the status endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
        }
    }
}

/// Response of the stats endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatsResponse {
    /// Number of users known to the directory
    pub users: usize,
}

/// Error payload rendered by the server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Machine-readable code plus a human message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
