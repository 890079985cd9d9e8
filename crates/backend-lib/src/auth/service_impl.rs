use std::sync::Arc;

use tracing::{debug, info};

use super::basic::BasicAuth;
use super::persistent_session::FileSessionPersistence;
use super::service::{Authenticator, RequestView};
use super::session::{token_prefix, SessionManager, SessionPolicy};
use crate::config::{AuthKind, Settings};
use crate::directory::{User, UserDirectory};

/// Gate that knows no users: every protected path is denied
pub struct NoAuth {
    session_name: String,
}

impl NoAuth {
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
        }
    }
}

impl Authenticator for NoAuth {
    fn kind(&self) -> AuthKind {
        AuthKind::Auth
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    fn current_user(&self, _request: &dyn RequestView) -> Option<User> {
        None
    }
}

/// Cookie based sessions; expiry and persistence come from the `SessionManager`
pub struct SessionAuth {
    kind: AuthKind,
    sessions: Arc<SessionManager>,
    users: Arc<dyn UserDirectory>,
    session_name: String,
}

impl SessionAuth {
    pub fn new(
        kind: AuthKind,
        sessions: Arc<SessionManager>,
        users: Arc<dyn UserDirectory>,
        session_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            sessions,
            users,
            session_name: session_name.into(),
        }
    }
}

impl Authenticator for SessionAuth {
    fn kind(&self) -> AuthKind {
        self.kind
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    fn current_user(&self, request: &dyn RequestView) -> Option<User> {
        let token = self.session_cookie(request)?;
        let user_id = self.sessions.user_id_for_session(&token)?;
        let user = self.users.find_by_id(&user_id);
        if user.is_none() {
            debug!(user_id = %user_id, token = %token_prefix(&token), "session points at unknown user");
        }
        user
    }
}

/// Authenticator plus the session manager behind it, when there is one
pub struct AuthSetup {
    pub auth: Option<Arc<dyn Authenticator>>,
    pub sessions: Option<Arc<SessionManager>>,
}

/// Build the session manager a session scheme needs
pub fn build_session_manager(settings: &Settings) -> anyhow::Result<Option<SessionManager>> {
    let kind = settings.auth_type;
    if !kind.uses_sessions() {
        return Ok(None);
    }
    let policy = match kind {
        AuthKind::SessionAuth => SessionPolicy::unlimited(),
        _ => SessionPolicy::from_secs(settings.session_duration_secs),
    };
    let manager = SessionManager::new(policy);
    if kind != AuthKind::SessionDbAuth {
        return Ok(Some(manager));
    }
    let persistence = FileSessionPersistence::open(&settings.session_store_path)?;
    Ok(Some(manager.with_persistence(Arc::new(persistence))))
}

/// Select the configured auth scheme once at startup
pub fn build_authenticator(
    settings: &Settings,
    users: Arc<dyn UserDirectory>,
) -> anyhow::Result<AuthSetup> {
    let session_name = settings.session_name.clone();
    let sessions = build_session_manager(settings)?.map(Arc::new);

    let auth: Option<Arc<dyn Authenticator>> = match (settings.auth_type, &sessions) {
        (AuthKind::None, _) => None,
        (AuthKind::Auth, _) => Some(Arc::new(NoAuth::new(session_name))),
        (AuthKind::BasicAuth, _) => Some(Arc::new(BasicAuth::new(users, session_name))),
        (kind, Some(sessions)) => Some(Arc::new(SessionAuth::new(
            kind,
            Arc::clone(sessions),
            users,
            session_name,
        ))),
        (kind, None) => anyhow::bail!("auth type {kind} needs a session manager"),
    };

    info!(
        auth_type = %settings.auth_type,
        max_age_secs = sessions
            .as_ref()
            .and_then(|s| s.policy().max_age())
            .map(|d| d.num_seconds()),
        persistent = sessions.as_ref().is_some_and(|s| s.is_persistent()),
        "authentication configured"
    );
    Ok(AuthSetup { auth, sessions })
}
