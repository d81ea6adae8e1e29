use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn login_returns_token_and_profile() {
    let ctx = test_support::setup_test_context().await;

    test_support::insert_user(ctx.state.db(), "login@example.com", "correct-pass").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "login@example.com", "password": "correct-pass"})),
        ))
        .await
        .expect("login");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["email"], "login@example.com");
    let token = body["access_token"].as_str().expect("access token").to_string();

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/auth/me", Some(&token), None))
        .await
        .expect("me");

    let status = response.status();
    let me = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {me}");
    assert_eq!(me["email"], "login@example.com");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let ctx = test_support::setup_test_context().await;

    test_support::insert_user(ctx.state.db(), "login@example.com", "correct-pass").await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "login@example.com", "password": "wrong-pass"})),
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_requires_token() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/auth/me", None, None))
        .await
        .expect("me without token");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
