// ============================
// crates/backend-lib/src/handlers/index.rs
// ============================
//! Status and canned error routes.
use std::sync::Arc;

use axum::{extract::State, Json};
use sessiongate_common::{StatsResponse, StatusResponse};

use crate::error::AppError;
use crate::AppState;

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

/// Number of users in the directory
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        users: state.users.count(),
    })
}

/// Always answers 401
pub async fn unauthorized() -> AppError {
    AppError::Unauthorized
}

/// Always answers 403
pub async fn forbidden() -> AppError {
    AppError::Forbidden
}
