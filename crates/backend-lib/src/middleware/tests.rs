use super::*;
use crate::auth::{hash_password_with_params, SessionManager};
use crate::config::{AuthKind, Settings};
use crate::directory::{InMemoryUserDirectory, User, UserDirectory};
use crate::AppState;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Extension, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use scrypt::Params;
use std::sync::Arc;
use tower::ServiceExt;

async fn whoami(user: Option<Extension<CurrentUser>>) -> String {
    user.map(|Extension(CurrentUser(u))| u.email)
        .unwrap_or_else(|| "anonymous".to_string())
}

fn state(kind: AuthKind) -> Arc<AppState> {
    let params = Params::new(4, 8, 1, 32).unwrap();
    let bob = User::with_password_hash(
        "bob@example.com",
        hash_password_with_params("secret1", params).unwrap(),
    );
    let users: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::with_users(vec![bob]));
    let settings = Settings {
        auth_type: kind,
        excluded_paths: vec!["/open/".to_string()],
        ..Settings::default()
    };
    Arc::new(AppState::new(settings, users).unwrap())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/open", get(whoami))
        .route("/private", get(whoami))
        .layer(axum::middleware::from_fn_with_state(state.clone(), auth_guard))
        .with_state(state)
}

async fn call(app: &Router, path: &str, header: Option<(&str, String)>) -> (StatusCode, String) {
    let mut builder = Request::builder().uri(path);
    if let Some((name, value)) = header {
        builder = builder.header(name, value);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn test_gate_off_lets_everything_through() {
    let app = app(state(AuthKind::None));
    assert_eq!(call(&app, "/private", None).await, (StatusCode::OK, "anonymous".to_string()));
}

#[tokio::test]
async fn test_basic_auth_statuses() {
    let app = app(state(AuthKind::BasicAuth));
    let good = format!("Basic {}", STANDARD.encode("bob@example.com:secret1"));
    let bad = format!("Basic {}", STANDARD.encode("bob@example.com:nope"));

    assert_eq!(call(&app, "/open", None).await.0, StatusCode::OK);
    assert_eq!(call(&app, "/private", None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        call(&app, "/private", Some(("Authorization", bad))).await.0,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        call(&app, "/private", Some(("Authorization", good))).await,
        (StatusCode::OK, "bob@example.com".to_string())
    );
}

#[tokio::test]
async fn test_no_auth_denies_protected_paths() {
    let app = app(state(AuthKind::Auth));
    assert_eq!(call(&app, "/open", None).await.0, StatusCode::OK);
    assert_eq!(call(&app, "/private", None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        call(&app, "/private", Some(("Authorization", "Basic eDp5".to_string()))).await.0,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_session_cookie_resolves_user() {
    let state = state(AuthKind::SessionAuth);
    let sessions: Arc<SessionManager> = state.sessions.clone().unwrap();
    let bob = state.users.find_by_email("bob@example.com").unwrap().remove(0);
    let token = sessions.create_session(&bob.id).unwrap();
    let app = app(state);

    assert_eq!(
        call(&app, "/private", Some(("Cookie", format!("_my_session_id={token}")))).await,
        (StatusCode::OK, "bob@example.com".to_string())
    );
    assert_eq!(
        call(&app, "/private", Some(("Cookie", "_my_session_id=forged".to_string()))).await.0,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_basic_auth_requests() {
    let app = app(state(AuthKind::BasicAuth));
    let good = format!("Basic {}", STANDARD.encode("bob@example.com:secret1"));
    let bad = format!("Basic {}", STANDARD.encode("bob@example.com:nope"));

    let calls = (0..8).map(|i| {
        let app = app.clone();
        let auth = if i % 2 == 0 { good.clone() } else { bad.clone() };
        tokio::spawn(async move { call(&app, "/private", Some(("Authorization", auth))).await.0 })
    });
    for (i, call) in calls.collect::<Vec<_>>().into_iter().enumerate() {
        let expected = if i % 2 == 0 { StatusCode::OK } else { StatusCode::FORBIDDEN };
        assert_eq!(call.await.unwrap(), expected);
    }
}
