// ============================
// crates/backend-lib/src/router.rs
// ============================
/** HTTP router for the `sessiongate` server.
Routes live under `/api/v1`. The authentication gate wraps every route,
the fallback included, whenever an auth scheme is configured. A trailing
slash is trimmed before routing, so `/api/v1/status/` and
`/api/v1/status` are the same route. */
use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    normalize_path::NormalizePath,
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    handlers::{index, password_reset, session_auth, users},
    middleware::auth_guard,
    AppState,
};

/// The service `create_router` builds
pub type App = NormalizePath<Router>;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> App {
    let api = Router::new()
        .route("/status", get(index::status))
        .route("/stats", get(index::stats))
        .route("/unauthorized", get(index::unauthorized))
        .route("/forbidden", get(index::forbidden))
        .route("/auth_session/login", post(session_auth::login))
        .route("/auth_session/logout", delete(session_auth::logout))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{user_id}", get(users::get_user))
        .route("/profile", get(users::profile))
        .route(
            "/reset_password",
            post(password_reset::reset_token).put(password_reset::update_password),
        );

    let mut router = Router::new()
        .nest("/api/v1", api)
        .fallback(not_found);

    if state.auth.is_some() {
        router = router.layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_guard,
        ));
    }

    let router = router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.settings.cors_origins))
        .with_state(state);

    // must wrap the router: layers added with `Router::layer` run after routing
    NormalizePath::trim_trailing_slash(router)
}

async fn not_found() -> AppError {
    AppError::NotFound
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            },
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}
