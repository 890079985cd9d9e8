// ============================
// sessiongate-lib/src/auth/error.rs
// ============================
//! Reasons an authentication step can fail.
//!
//! These never cross the gateway boundary: `Authenticator::current_user`,
//! `SessionManager::user_id_for_session` and `SessionManager::destroy_session`
//! collapse them into `None`/`false` after logging.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header is not a Basic credential")]
    MalformedHeader,

    #[error("credential is not valid base64 encoded UTF-8")]
    DecodeFailure,

    #[error("decoded credential has no ':' delimiter")]
    MissingDelimiter,

    #[error("no user matches the supplied identifier")]
    UnknownIdentifier,

    #[error("password does not match any candidate user")]
    SecretMismatch,

    #[error("user directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("session token not found")]
    TokenNotFound,

    #[error("session token expired")]
    TokenExpired,

    #[error("user id is empty")]
    InvalidUserId,

    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AuthError {
    /// Short stable label used as a log field
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MalformedHeader => "malformed_header",
            AuthError::DecodeFailure => "decode_failure",
            AuthError::MissingDelimiter => "missing_delimiter",
            AuthError::UnknownIdentifier => "unknown_identifier",
            AuthError::SecretMismatch => "secret_mismatch",
            AuthError::DirectoryUnavailable(_) => "directory_unavailable",
            AuthError::TokenNotFound => "token_not_found",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidUserId => "invalid_user_id",
            AuthError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}
