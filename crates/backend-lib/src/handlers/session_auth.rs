// ============================
// crates/backend-lib/src/handlers/session_auth.rs
// ============================
//! Session login and logout.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    response::IntoResponse,
    Form, Json,
};
use metrics::counter;
use serde_json::json;
use sessiongate_common::LoginForm;
use tracing::{debug, info};

use crate::auth::{cookie, RequestView};
use crate::error::AppError;
use crate::handlers::required;
use crate::metrics::LOGIN_FAILED;
use crate::AppState;

/// `POST /auth_session/login`: check the form credentials and open a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let email = required(form.email, "email missing")?;
    let password = required(form.password, "password missing")?;

    let user = match state.users.find_by_email(&email) {
        Ok(users) => users.into_iter().next(),
        Err(err) => {
            debug!(error = %err, "user lookup failed during login");
            None
        },
    };
    let Some(user) = user else {
        counter!(LOGIN_FAILED, "reason" => "unknown_email").increment(1);
        return Err(AppError::UnknownEmail);
    };
    // scrypt is CPU bound
    let (user, verified) = tokio::task::spawn_blocking(move || {
        let verified = user.verify_password(&password);
        (user, verified)
    })
    .await
    .map_err(|err| AppError::Internal(err.to_string()))?;
    if !verified {
        counter!(LOGIN_FAILED, "reason" => "wrong_password").increment(1);
        return Err(AppError::WrongPassword);
    }

    let sessions = state
        .sessions
        .as_ref()
        .ok_or_else(|| AppError::Internal("session login needs a session scheme".to_string()))?;
    let token = sessions
        .create_session(&user.id)
        .ok_or_else(|| AppError::Internal("could not create session".to_string()))?;

    info!(user_id = %user.id, name = %user.display_name(), "user logged in");
    let set_cookie = cookie::session_cookie(state.session_name(), &token);
    Ok(([(SET_COOKIE, set_cookie)], Json(user.to_json())))
}

/// `DELETE /auth_session/logout`: destroy the session named by the cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<impl IntoResponse, AppError> {
    let token = match &state.auth {
        Some(auth) => auth.session_cookie(&request),
        None => request.cookie(state.session_name()),
    };
    let destroyed = match (&state.sessions, token) {
        (Some(sessions), Some(token)) => sessions.destroy_session(&token),
        _ => false,
    };
    if !destroyed {
        return Err(AppError::NotFound);
    }

    let clear = cookie::expired_session_cookie(state.session_name());
    Ok(([(SET_COOKIE, clear)], Json(json!({}))))
}
