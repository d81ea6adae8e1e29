use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn owner_can_add_material_to_own_section() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let section = test_support::insert_section(ctx.state.db(), &owner.id, "Calculus", false).await;
    let token = test_support::bearer_token(&owner.id, ctx.state.settings());

    let payload = json!({
        "section_id": section.id,
        "title": "Derivatives",
        "content": "The derivative measures local change.",
        "is_public": false
    });

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/materials/create/",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("create material");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["section_id"], section.id.as_str());
    assert_eq!(created["owner_id"], owner.id.as_str());
    assert_eq!(created["title"], "Derivatives");
}

#[tokio::test]
async fn create_in_foreign_section_is_forbidden_and_writes_nothing() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let intruder =
        test_support::insert_user(ctx.state.db(), "intruder@example.com", "intruder-pass").await;
    let section = test_support::insert_section(ctx.state.db(), &owner.id, "Calculus", true).await;
    let token = test_support::bearer_token(&intruder.id, ctx.state.settings());

    let payload = json!({
        "section_id": section.id,
        "title": "Sneaky",
        "content": "should not land"
    });

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/materials/create/",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("create material");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let rows = repositories::materials::list_by_section_ids(ctx.state.db(), &[section.id.clone()])
        .await
        .expect("list materials");
    assert!(rows.is_empty());
}

#[tokio::test]
async fn create_with_unknown_section_returns_404() {
    let ctx = test_support::setup_test_context().await;

    let user = test_support::insert_user(ctx.state.db(), "user@example.com", "user-pass").await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let payload = json!({
        "section_id": "00000000-0000-0000-0000-000000000000",
        "title": "Orphan",
        "content": "no parent"
    });

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/materials/create/",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("create material");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_keeps_section_pinned() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let section = test_support::insert_section(ctx.state.db(), &owner.id, "Calculus", false).await;
    let other_section =
        test_support::insert_section(ctx.state.db(), &owner.id, "Algebra", false).await;
    let material =
        test_support::insert_material(ctx.state.db(), &section, "Derivatives", false).await;
    let token = test_support::bearer_token(&owner.id, ctx.state.settings());

    // A section_id in the payload is ignored; only the writable fields move.
    let payload = json!({
        "section_id": other_section.id,
        "title": "Integrals",
        "content": "Updated body"
    });

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/materials/{}/update/", material.id),
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("update material");

    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["title"], "Integrals");
    assert_eq!(updated["content"], "Updated body");
    assert_eq!(updated["section_id"], section.id.as_str());
}

#[tokio::test]
async fn list_mixes_own_and_public_materials() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let other = test_support::insert_user(ctx.state.db(), "other@example.com", "other-pass").await;
    let own_section =
        test_support::insert_section(ctx.state.db(), &owner.id, "Mine", false).await;
    let other_section =
        test_support::insert_section(ctx.state.db(), &other.id, "Theirs", false).await;

    let own_private =
        test_support::insert_material(ctx.state.db(), &own_section, "Own Private", false).await;
    let foreign_public =
        test_support::insert_material(ctx.state.db(), &other_section, "Foreign Public", true).await;
    test_support::insert_material(ctx.state.db(), &other_section, "Foreign Private", false).await;

    let token = test_support::bearer_token(&owner.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/materials/", Some(&token), None))
        .await
        .expect("list materials");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    let mut ids: Vec<&str> =
        listed.as_array().unwrap().iter().filter_map(|item| item["id"].as_str()).collect();
    ids.sort_unstable();
    let mut expected = vec![own_private.id.as_str(), foreign_public.id.as_str()];
    expected.sort_unstable();
    assert_eq!(ids, expected);
}
