// ============================
// crates/backend-lib/src/metrics.rs
// ============================

//! Central place for metric keys
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_DESTROYED: &str = "session.destroyed";
pub const SESSION_PURGED: &str = "session.purged";
pub const SESSION_ACTIVE: &str = "session.active";
pub const AUTH_DENIED: &str = "auth.denied";
pub const LOGIN_FAILED: &str = "auth.login_failed";
pub const PASSWORD_RESET: &str = "auth.password_reset";
