// ============================
// crates/backend-lib/src/handlers/password_reset.rs
// ============================
//! Password reset: issue a single-use token, then trade it for a new password.
use std::sync::Arc;

use axum::{extract::State, Form, Json};
use metrics::counter;
use sessiongate_common::{EmailMessage, ResetPasswordForm, ResetTokenForm, ResetTokenResponse};
use tracing::info;

use crate::auth::{password::hash_password_secure, token_generator::generate_secure_token};
use crate::directory::DirectoryError;
use crate::error::AppError;
use crate::handlers::required;
use crate::metrics::PASSWORD_RESET;
use crate::AppState;

/// `POST /reset_password`: issue a reset token for a registered email
pub async fn reset_token(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ResetTokenForm>,
) -> Result<Json<ResetTokenResponse>, AppError> {
    let email = required(form.email, "email missing")?;

    let token = generate_secure_token();
    let user = state.users.set_reset_token(&email, &token)?;
    counter!(PASSWORD_RESET, "step" => "token_issued").increment(1);
    info!(user_id = %user.id, "password reset token issued");

    Ok(Json(ResetTokenResponse {
        email,
        reset_token: token,
    }))
}

/// `PUT /reset_password`: set a new password if the reset token matches
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Json<EmailMessage>, AppError> {
    let email = required(form.email, "email missing")?;
    let reset_token = required(form.reset_token, "reset_token missing")?;
    let new_password = required(form.new_password, "new_password missing")?;

    let hash = tokio::task::spawn_blocking(move || {
        let mut new_password = new_password;
        hash_password_secure(&mut new_password)
    })
    .await
    .map_err(|err| AppError::Internal(err.to_string()))??;

    let user = match state.users.update_password(&email, &reset_token, hash) {
        Ok(user) => user,
        Err(err @ (DirectoryError::NotFound | DirectoryError::InvalidResetToken)) => {
            counter!(PASSWORD_RESET, "step" => "rejected").increment(1);
            return Err(err.into());
        },
        Err(err) => return Err(err.into()),
    };
    counter!(PASSWORD_RESET, "step" => "password_updated").increment(1);
    info!(user_id = %user.id, "password updated");

    Ok(Json(EmailMessage {
        email,
        message: "Password updated".to_string(),
    }))
}
