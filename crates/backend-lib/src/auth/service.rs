// =============
// crates/backend-lib/src/auth/service.rs
// =============
//! This module defines the `Authenticator` trait, the per-request gate every
//! auth scheme implements, and the `RequestView` it reads requests through.
use axum::http::{header, request::Parts, HeaderMap, Request};

use super::cookie;
use crate::config::AuthKind;
use crate::directory::User;

/// Read-only view of the parts of an HTTP request the gate inspects
pub trait RequestView {
    fn path(&self) -> &str;

    fn header(&self, name: &str) -> Option<&str>;

    /// Value of cookie `name`; the default reads a single `Cookie` header
    fn cookie(&self, name: &str) -> Option<String> {
        self.header(header::COOKIE.as_str())
            .and_then(|h| cookie::cookie_value(h, name))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

// HTTP/2 clients may split cookies over several headers
fn cookie_from_headers(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|h| cookie::cookie_value(h, name))
}

impl<B> RequestView for Request<B> {
    fn path(&self) -> &str {
        self.uri().path()
    }

    fn header(&self, name: &str) -> Option<&str> {
        header_str(self.headers(), name)
    }

    fn cookie(&self, name: &str) -> Option<String> {
        cookie_from_headers(self.headers(), name)
    }
}

impl RequestView for Parts {
    fn path(&self) -> &str {
        self.uri.path()
    }

    fn header(&self, name: &str) -> Option<&str> {
        header_str(&self.headers, name)
    }

    fn cookie(&self, name: &str) -> Option<String> {
        cookie_from_headers(&self.headers, name)
    }
}

/// Result of gating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Path is excluded from authentication
    Public,
    /// A principal was resolved
    Authenticated(User),
    /// Neither an `Authorization` header nor a session cookie was sent
    MissingCredentials,
    /// Credential material was sent but did not resolve to a user
    InvalidCredentials,
}

fn strip_one_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Whether `path` needs authentication given the excluded paths.
///
/// Comparison ignores ASCII case and a single trailing slash on either side.
/// An empty path never needs authentication.
pub fn require_auth(path: &str, excluded_paths: &[String]) -> bool {
    if path.is_empty() {
        return false;
    }
    let path = strip_one_slash(path);
    !excluded_paths
        .iter()
        .any(|excluded| strip_one_slash(excluded).eq_ignore_ascii_case(path))
}

/// Per-request authentication gate implemented by every auth scheme
pub trait Authenticator: Send + Sync {
    /// Configured scheme this authenticator implements
    fn kind(&self) -> AuthKind;

    /// Name of the cookie carrying the session token
    fn session_name(&self) -> &str;

    /// Resolve the user behind the request, if any
    fn current_user(&self, request: &dyn RequestView) -> Option<User>;

    fn require_auth(&self, path: &str, excluded_paths: &[String]) -> bool {
        require_auth(path, excluded_paths)
    }

    fn authorization_header<'r>(&self, request: &'r dyn RequestView) -> Option<&'r str> {
        request.header(header::AUTHORIZATION.as_str())
    }

    fn session_cookie(&self, request: &dyn RequestView) -> Option<String> {
        request.cookie(self.session_name())
    }

    /// Decide the fate of a request. Missing credential material and
    /// credentials that fail to resolve are reported separately so the
    /// host can answer 401 and 403 respectively.
    fn authorize(&self, request: &dyn RequestView, excluded_paths: &[String]) -> AuthOutcome {
        if !self.require_auth(request.path(), excluded_paths) {
            return AuthOutcome::Public;
        }
        if self.authorization_header(request).is_none() && self.session_cookie(request).is_none() {
            return AuthOutcome::MissingCredentials;
        }
        match self.current_user(request) {
            Some(user) => AuthOutcome::Authenticated(user),
            None => AuthOutcome::InvalidCredentials,
        }
    }
}
