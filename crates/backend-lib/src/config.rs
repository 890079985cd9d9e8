// ============================
// sessiongate-lib/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::cookie::is_valid_cookie_name;

/// Prefix of environment variables that override settings
pub const ENV_PREFIX: &str = "SESSIONGATE_";

/// Default name of the session cookie
pub const DEFAULT_SESSION_NAME: &str = "_my_session_id";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Authentication scheme, chosen once at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// No gate at all
    #[default]
    None,
    /// Gate without any scheme: protected paths are always denied
    Auth,
    /// HTTP Basic credentials
    BasicAuth,
    /// In-memory sessions that never expire
    SessionAuth,
    /// In-memory sessions with a max-age
    SessionExpAuth,
    /// Sessions with a max-age, persisted to disk
    SessionDbAuth,
}

impl AuthKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthKind::None => "none",
            AuthKind::Auth => "auth",
            AuthKind::BasicAuth => "basic_auth",
            AuthKind::SessionAuth => "session_auth",
            AuthKind::SessionExpAuth => "session_exp_auth",
            AuthKind::SessionDbAuth => "session_db_auth",
        }
    }

    /// Whether this scheme logs users in through session cookies
    pub fn uses_sessions(&self) -> bool {
        matches!(
            self,
            AuthKind::SessionAuth | AuthKind::SessionExpAuth | AuthKind::SessionDbAuth
        )
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Active authentication scheme
    pub auth_type: AuthKind,
    /// Name of the session cookie
    pub session_name: String,
    /// Session max-age in seconds; zero or negative means sessions never expire
    pub session_duration_secs: i64,
    /// Directory of the persisted session store (`session_db_auth` only)
    pub session_store_path: PathBuf,
    /// JSON file backing the user directory; in-memory only when unset
    pub users_file: Option<PathBuf>,
    /// Paths served without authentication
    pub excluded_paths: Vec<String>,
    /// Allowed CORS origins, `*` for any
    pub cors_origins: Vec<String>,
    /// Interval of the expired-session purge; zero disables it
    pub purge_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            log_level: "info".to_string(),
            auth_type: AuthKind::None,
            session_name: DEFAULT_SESSION_NAME.to_string(),
            session_duration_secs: 0,
            session_store_path: PathBuf::from("data/sessions"),
            users_file: None,
            excluded_paths: vec![
                "/api/v1/status/".to_string(),
                "/api/v1/unauthorized/".to_string(),
                "/api/v1/forbidden/".to_string(),
                "/api/v1/auth_session/login/".to_string(),
                "/api/v1/reset_password/".to_string(),
            ],
            cors_origins: vec!["*".to_string()],
            purge_interval_secs: 0,
        }
    }
}

impl Settings {
    /// Layered sources: defaults, then the TOML file, then `SESSIONGATE_*` variables
    pub fn figment(config_file: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_file.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate settings from `config_file` and the environment
    pub fn load_from(config_file: impl AsRef<Path>) -> Result<Self> {
        let settings: Settings = Self::figment(config_file).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            bail!("invalid log level: {}", self.log_level);
        }
        if !is_valid_cookie_name(&self.session_name) {
            bail!("invalid session cookie name: {:?}", self.session_name);
        }
        if self.excluded_paths.iter().any(|p| p.trim().is_empty()) {
            bail!("excluded paths must not be empty");
        }
        if self.cors_origins.is_empty() {
            bail!("at least one CORS origin is required");
        }
        Ok(())
    }
}
