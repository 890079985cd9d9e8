// ============================
// sessiongate-lib/src/lib.rs
// ============================
//! Core functionality of the `sessiongate` API server: Basic and session-cookie
//! authentication in front of a small user API.

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;

use std::sync::Arc;

use crate::auth::{build_authenticator, Authenticator, SessionManager};
use crate::config::Settings;
use crate::directory::{InMemoryUserDirectory, UserDirectory};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Active authentication scheme; `None` when the gate is off
    pub auth: Option<Arc<dyn Authenticator>>,
    /// Session manager of the session schemes
    pub sessions: Option<Arc<SessionManager>>,
    /// User directory
    pub users: Arc<dyn UserDirectory>,
    /// Settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state for `settings` over `users`
    pub fn new(settings: Settings, users: Arc<dyn UserDirectory>) -> anyhow::Result<Self> {
        let setup = build_authenticator(&settings, Arc::clone(&users))?;
        Ok(Self {
            auth: setup.auth,
            sessions: setup.sessions,
            users,
            settings: Arc::new(settings),
        })
    }

    /// Create the state with the user directory named by `settings.users_file`
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let users: Arc<dyn UserDirectory> = match &settings.users_file {
            Some(path) => Arc::new(InMemoryUserDirectory::open(path)?),
            None => Arc::new(InMemoryUserDirectory::new()),
        };
        Self::new(settings, users)
    }

    /// Name of the session cookie
    pub fn session_name(&self) -> &str {
        &self.settings.session_name
    }
}
