mod common;

use axum::http::{header, StatusCode};
use common::*;
use sessiongate_lib::config::AuthKind;

const NEW_PASSWORD: &str = "N3wPassw0rd";

fn request_token(email: &str) -> axum::http::Request<axum::body::Body> {
    form("POST", "/api/v1/reset_password", &format!("email={email}"))
}

fn update_password(email: &str, token: &str, password: &str) -> axum::http::Request<axum::body::Body> {
    form(
        "PUT",
        "/api/v1/reset_password",
        &format!("email={email}&reset_token={token}&new_password={password}"),
    )
}

#[tokio::test]
async fn reset_token_needs_a_registered_email() {
    let (app, _) = app_with(settings(AuthKind::SessionAuth), directory());

    let reply = send(&app, form("POST", "/api/v1/reset_password", "")).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(&app, request_token("nobody@example.com")).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = send(&app, request_token(EMAIL)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["email"], EMAIL);
    assert!(reply.body["reset_token"].as_str().unwrap().len() >= 22);
}

#[tokio::test]
async fn reset_token_changes_the_password_once() {
    let (app, _) = app_with(settings(AuthKind::SessionAuth), directory());

    let token = send(&app, request_token(EMAIL)).await.body["reset_token"]
        .as_str()
        .unwrap()
        .to_string();

    let reply = send(&app, update_password(EMAIL, "not-the-token", NEW_PASSWORD)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(send(&app, login(EMAIL, PASSWORD)).await.status, StatusCode::OK);

    let reply = send(&app, update_password(EMAIL, &token, NEW_PASSWORD)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        serde_json::json!({ "email": EMAIL, "message": "Password updated" })
    );

    // the token is spent
    let reply = send(&app, update_password(EMAIL, &token, "An0ther")).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    assert_eq!(send(&app, login(EMAIL, PASSWORD)).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&app, login(EMAIL, NEW_PASSWORD)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn a_newer_token_replaces_the_older_one() {
    let (app, _) = app_with(settings(AuthKind::SessionAuth), directory());

    let first = send(&app, request_token(EMAIL)).await.body["reset_token"].clone();
    let second = send(&app, request_token(EMAIL)).await.body["reset_token"].clone();
    assert_ne!(first, second);

    let reply = send(&app, update_password(EMAIL, first.as_str().unwrap(), NEW_PASSWORD)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    let reply = send(&app, update_password(EMAIL, second.as_str().unwrap(), NEW_PASSWORD)).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn password_update_validates_form() {
    let (app, _) = app_with(settings(AuthKind::SessionAuth), directory());

    for (body, message) in [
        ("reset_token=t&new_password=p", "email missing"),
        ("email=bob@example.com&new_password=p", "reset_token missing"),
        ("email=bob@example.com&reset_token=t", "new_password missing"),
    ] {
        let reply = send(&app, form("PUT", "/api/v1/reset_password", body)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(reply.body["error"]["message"], message);
    }

    let reply = send(&app, update_password("nobody@example.com", "t", NEW_PASSWORD)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn profile_shows_the_session_user() {
    let (app, _) = app_with(settings(AuthKind::SessionAuth), directory());

    assert_eq!(send(&app, get("/api/v1/profile")).await.status, StatusCode::UNAUTHORIZED);

    let reply = send(&app, login(EMAIL, PASSWORD)).await;
    let cookie = cookie_pair(&reply.set_cookie.unwrap());
    let reply = send(&app, get_with("/api/v1/profile", header::COOKIE, &cookie)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, serde_json::json!({ "email": EMAIL }));

    send(&app, logout(Some(&cookie))).await;
    let reply = send(&app, get_with("/api/v1/profile", header::COOKIE, &cookie)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn profile_without_a_gate_is_forbidden() {
    let (app, _) = app_with(settings(AuthKind::None), directory());
    assert_eq!(send(&app, get("/api/v1/profile")).await.status, StatusCode::FORBIDDEN);
}
