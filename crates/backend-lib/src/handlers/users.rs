// ============================
// crates/backend-lib/src/handlers/users.rs
// ============================
//! User directory routes.
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sessiongate_common::{NewUser, ProfileResponse, UserJson};

use crate::auth::password::hash_password_secure;
use crate::directory::User;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::AppState;

pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<UserJson>> {
    Json(state.users.all().iter().map(User::to_json).collect())
}

/// `GET /users/{id}`; `me` is the authenticated user
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    current: Option<Extension<CurrentUser>>,
) -> Result<Json<UserJson>, AppError> {
    let user = if user_id == "me" {
        current.map(|Extension(CurrentUser(user))| user)
    } else {
        state.users.find_by_id(&user_id)
    };
    user.map(|u| Json(u.to_json())).ok_or(AppError::NotFound)
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<UserJson>), AppError> {
    let email = body
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::InvalidInput("email missing".to_string()))?;
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::InvalidInput("password missing".to_string()))?;

    // hashing is CPU bound
    let hash = tokio::task::spawn_blocking(move || {
        let mut password = password;
        hash_password_secure(&mut password)
    })
    .await
    .map_err(|err| AppError::Internal(err.to_string()))??;
    let user = User::with_password_hash(email, hash).with_names(body.first_name, body.last_name);

    state.users.insert(user.clone())?;
    tracing::info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user.to_json())))
}

/// `GET /profile`: email of the authenticated user, 403 without one
pub async fn profile(
    current: Option<Extension<CurrentUser>>,
) -> Result<Json<ProfileResponse>, AppError> {
    current
        .map(|Extension(CurrentUser(user))| Json(ProfileResponse { email: user.email }))
        .ok_or(AppError::Forbidden)
}
