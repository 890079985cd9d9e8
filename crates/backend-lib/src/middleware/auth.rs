use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::counter;

use crate::auth::AuthOutcome;
use crate::directory::User;
use crate::error::AppError;
use crate::metrics::AUTH_DENIED;
use crate::AppState;

/// The authenticated user, stored in the request extensions by `auth_guard`
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authentication gate: 401 without credentials, 403 with unusable ones
pub async fn auth_guard(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(auth) = state.auth.clone() else {
        return Ok(next.run(request).await);
    };

    // Basic credentials are checked with scrypt, which is CPU bound
    let (mut request, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = auth.authorize(&request, &state.settings.excluded_paths);
        (request, outcome)
    })
    .await
    .map_err(|err| AppError::Internal(err.to_string()))?;

    match outcome {
        AuthOutcome::Public => {},
        AuthOutcome::Authenticated(user) => {
            tracing::debug!(user_id = %user.id, path = request.uri().path(), "request authenticated");
            request.extensions_mut().insert(CurrentUser(user));
        },
        AuthOutcome::MissingCredentials => {
            counter!(AUTH_DENIED, "status" => "401").increment(1);
            tracing::debug!(path = request.uri().path(), "no credentials");
            return Err(AppError::Unauthorized);
        },
        AuthOutcome::InvalidCredentials => {
            counter!(AUTH_DENIED, "status" => "403").increment(1);
            tracing::debug!(path = request.uri().path(), "credentials rejected");
            return Err(AppError::Forbidden);
        },
    }

    Ok(next.run(request).await)
}
