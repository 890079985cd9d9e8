// ============================
// sessiongate-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod basic;
pub mod clock;
pub mod cookie;
pub mod error;
pub mod password;
pub mod persistent_session;
mod service;
mod service_impl;
pub mod session;
pub mod token_generator;

pub use basic::BasicAuth;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use password::{hash_password, hash_password_with_params, verify_password};
pub use persistent_session::{FileSessionPersistence, PersistenceError, SessionPersistence};
pub use service::{require_auth, AuthOutcome, Authenticator, RequestView};
pub use service_impl::{build_authenticator, build_session_manager, AuthSetup, NoAuth, SessionAuth};
pub use session::{SessionManager, SessionPolicy, SessionRecord, SessionStore};
