// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `sessiongate` API server.

pub mod auth;

pub use auth::{auth_guard, CurrentUser};

#[cfg(test)]
mod tests;
