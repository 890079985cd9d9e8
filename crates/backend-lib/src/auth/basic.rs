// ============================
// sessiongate-lib/src/auth/basic.rs
// ============================
//! HTTP Basic authentication.
//!
//! The header goes through three decoding steps before the credentials are
//! checked against the user directory. Each step reports why it failed.
//! `BasicAuth::current_user` only keeps whether a user came out at the end.
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use super::error::AuthError;
use super::service::{Authenticator, RequestView};
use crate::config::AuthKind;
use crate::directory::{User, UserDirectory};

const BASIC_PREFIX: &str = "Basic ";

/// Take the encoded credential out of a `Basic` authorization header.
///
/// The prefix check is case-sensitive. The credential is whatever follows the
/// last single space, so `"Basic a b"` yields `"b"` and a trailing space
/// yields an empty credential.
pub fn extract_base64_authorization_header(header: &str) -> Result<&str, AuthError> {
    if !header.starts_with(BASIC_PREFIX) {
        return Err(AuthError::MalformedHeader);
    }
    Ok(header.rsplit(' ').next().unwrap_or_default())
}

/// Decode a standard (padded) base64 credential into UTF-8 text
pub fn decode_base64_authorization_header(encoded: &str) -> Result<String, AuthError> {
    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|_| AuthError::DecodeFailure)?;
    String::from_utf8(bytes).map_err(|_| AuthError::DecodeFailure)
}

/// Split `email:password` on the first colon; the password may contain colons
pub fn extract_user_credentials(decoded: &str) -> Result<(String, String), AuthError> {
    decoded
        .split_once(':')
        .map(|(email, password)| (email.to_string(), password.to_string()))
        .ok_or(AuthError::MissingDelimiter)
}

/// Basic authentication against a user directory
pub struct BasicAuth {
    users: Arc<dyn UserDirectory>,
    session_name: String,
}

impl BasicAuth {
    pub fn new(users: Arc<dyn UserDirectory>, session_name: impl Into<String>) -> Self {
        Self {
            users,
            session_name: session_name.into(),
        }
    }

    /// First user with this email whose password matches, in directory order
    pub fn user_object_from_credentials(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let candidates = self
            .users
            .find_by_email(email)
            .map_err(|err| AuthError::DirectoryUnavailable(err.to_string()))?;
        if candidates.is_empty() {
            return Err(AuthError::UnknownIdentifier);
        }
        candidates
            .into_iter()
            .find(|user| user.verify_password(password))
            .ok_or(AuthError::SecretMismatch)
    }

    fn resolve(&self, header: &str) -> Result<User, AuthError> {
        let encoded = extract_base64_authorization_header(header)?;
        let decoded = decode_base64_authorization_header(encoded)?;
        let (email, password) = extract_user_credentials(&decoded)?;
        self.user_object_from_credentials(&email, &password)
    }
}

impl Authenticator for BasicAuth {
    fn kind(&self) -> AuthKind {
        AuthKind::BasicAuth
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    fn current_user(&self, request: &dyn RequestView) -> Option<User> {
        let header = self.authorization_header(request)?;
        match self.resolve(header) {
            Ok(user) => Some(user),
            Err(err) => {
                debug!(reason = err.reason(), error = %err, path = request.path(), "basic auth rejected");
                None
            },
        }
    }
}
