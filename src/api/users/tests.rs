use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn registration_succeeds_without_auth() {
    let ctx = test_support::setup_test_context().await;

    let payload = json!({
        "email": "newcomer@example.com",
        "password": "long-enough-pass"
    });

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::POST, "/users/create/", None, Some(payload)))
        .await
        .expect("create user");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["email"], "newcomer@example.com");
    assert_eq!(created["is_moderator"], false);
    assert!(created.get("password").is_none());
    assert!(created.get("hashed_password").is_none());
}

#[tokio::test]
async fn registration_rejects_bad_payloads() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/users/create/",
            None,
            Some(json!({"email": "not-an-email", "password": "long-enough-pass"})),
        ))
        .await
        .expect("bad email");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/users/create/",
            None,
            Some(json!({"email": "short@example.com", "password": "short"})),
        ))
        .await
        .expect("short password");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_returns_conflict() {
    let ctx = test_support::setup_test_context().await;

    test_support::insert_user(ctx.state.db(), "taken@example.com", "first-pass").await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/users/create/",
            None,
            Some(json!({"email": "taken@example.com", "password": "second-pass"})),
        ))
        .await
        .expect("duplicate create");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_requires_authentication() {
    let ctx = test_support::setup_test_context().await;

    let user = test_support::insert_user(ctx.state.db(), "user@example.com", "user-pass").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/users/", None, None))
        .await
        .expect("anonymous list");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = test_support::bearer_token(&user.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/users/", Some(&token), None))
        .await
        .expect("authenticated list");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn update_and_delete_user() {
    let ctx = test_support::setup_test_context().await;

    let user = test_support::insert_user(ctx.state.db(), "user@example.com", "user-pass").await;
    let other = test_support::insert_user(ctx.state.db(), "other@example.com", "other-pass").await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    // Email collision with another account is rejected.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/users/{}/update/", user.id),
            Some(&token),
            Some(json!({"email": other.email})),
        ))
        .await
        .expect("conflicting update");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/users/{}/update/", user.id),
            Some(&token),
            Some(json!({"email": "renamed@example.com"})),
        ))
        .await
        .expect("update user");

    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["email"], "renamed@example.com");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/users/{}/delete/", other.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete user");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/users/{}/", other.id),
            Some(&token),
            None,
        ))
        .await
        .expect("get deleted user");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
