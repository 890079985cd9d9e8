#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use scrypt::Params;
use sessiongate_lib::{
    auth::hash_password_with_params,
    config::{AuthKind, Settings},
    directory::{InMemoryUserDirectory, User, UserDirectory},
    router::{create_router, App},
    AppState,
};
use tower::ServiceExt;

pub const EMAIL: &str = "bob@example.com";
pub const PASSWORD: &str = "H0lberton!";

pub fn test_user(email: &str, password: &str) -> User {
    let params = Params::new(4, 8, 1, 32).unwrap();
    User::with_password_hash(email, hash_password_with_params(password, params).unwrap())
}

pub fn directory() -> Arc<dyn UserDirectory> {
    Arc::new(InMemoryUserDirectory::with_users(vec![test_user(EMAIL, PASSWORD)]))
}

pub fn settings(kind: AuthKind) -> Settings {
    Settings {
        auth_type: kind,
        ..Settings::default()
    }
}

pub fn app_with(settings: Settings, users: Arc<dyn UserDirectory>) -> (App, Arc<AppState>) {
    let state = Arc::new(AppState::new(settings, users).unwrap());
    (create_router(Arc::clone(&state)), state)
}

pub struct Reply {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: serde_json::Value,
}

pub async fn send(app: &App, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply {
        status,
        set_cookie,
        body,
    }
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub fn get_with(path: &str, name: header::HeaderName, value: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

pub fn login(email: &str, password: &str) -> Request<Body> {
    form(
        "POST",
        "/api/v1/auth_session/login",
        &format!("email={email}&password={password}"),
    )
}

pub fn form(method: &str, path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn logout(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("DELETE")
        .uri("/api/v1/auth_session/logout");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name=value` part of a `Set-Cookie` header
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}
