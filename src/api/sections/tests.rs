use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn owner_can_create_and_retrieve_section() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let token = test_support::bearer_token(&owner.id, ctx.state.settings());

    let payload = json!({
        "title": "Linear Algebra",
        "description": "Vectors and matrices",
        "is_public": false
    });

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/sections/create/",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("create section");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["title"], "Linear Algebra");
    assert_eq!(created["owner_id"], owner.id.as_str());
    assert_eq!(created["materials_count"], 0);
    let section_id = created["id"].as_str().expect("section id").to_string();

    // Retrieval is read-only; a repeated GET returns the same body.
    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                &format!("/sections/{section_id}/"),
                Some(&token),
                None,
            ))
            .await
            .expect("get section");

        let status = response.status();
        let fetched = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {fetched}");
        assert_eq!(fetched["id"], section_id.as_str());
        assert_eq!(fetched["title"], "Linear Algebra");
    }
}

#[tokio::test]
async fn create_section_rejects_blank_title_and_missing_auth() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let token = test_support::bearer_token(&owner.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/sections/create/",
            Some(&token),
            Some(json!({"title": "   "})),
        ))
        .await
        .expect("blank title");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/sections/create/",
            None,
            Some(json!({"title": "Physics"})),
        ))
        .await
        .expect("no auth");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn private_section_is_hidden_from_strangers() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let stranger =
        test_support::insert_user(ctx.state.db(), "stranger@example.com", "stranger-pass").await;
    let section =
        test_support::insert_section(ctx.state.db(), &owner.id, "Private Notes", false).await;
    let stranger_token = test_support::bearer_token(&stranger.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/sections/{}/", section.id),
            Some(&stranger_token),
            None,
        ))
        .await
        .expect("get foreign section");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/sections/",
            Some(&stranger_token),
            None,
        ))
        .await
        .expect("list sections");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn foreign_user_cannot_update_or_delete_section() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let intruder =
        test_support::insert_user(ctx.state.db(), "intruder@example.com", "intruder-pass").await;
    let section = test_support::insert_section(ctx.state.db(), &owner.id, "Algebra", true).await;
    let intruder_token = test_support::bearer_token(&intruder.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/sections/{}/update/", section.id),
            Some(&intruder_token),
            Some(json!({"title": "Hijacked"})),
        ))
        .await
        .expect("foreign update");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let unchanged = repositories::sections::find_by_id(ctx.state.db(), &section.id)
        .await
        .expect("section lookup")
        .expect("section row");
    assert_eq!(unchanged.title, "Algebra");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/sections/{}/delete/", section.id),
            Some(&intruder_token),
            None,
        ))
        .await
        .expect("foreign delete");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let survivor = repositories::sections::find_by_id(ctx.state.db(), &section.id)
        .await
        .expect("section lookup");
    assert!(survivor.is_some());
}

#[tokio::test]
async fn public_section_is_listed_but_not_retrievable_by_strangers() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let stranger =
        test_support::insert_user(ctx.state.db(), "stranger@example.com", "stranger-pass").await;
    let section =
        test_support::insert_section(ctx.state.db(), &owner.id, "Open Course", true).await;
    let stranger_token = test_support::bearer_token(&stranger.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/sections/",
            Some(&stranger_token),
            None,
        ))
        .await
        .expect("list sections");

    let listed = test_support::read_json(response).await;
    let ids: Vec<&str> =
        listed.as_array().unwrap().iter().filter_map(|item| item["id"].as_str()).collect();
    assert_eq!(ids, vec![section.id.as_str()]);

    // Object-level access stays owner-or-moderator even for public sections.
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/sections/{}/", section.id),
            Some(&stranger_token),
            None,
        ))
        .await
        .expect("get public section");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unauthenticated_list_returns_public_only() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    test_support::insert_section(ctx.state.db(), &owner.id, "Private", false).await;
    let public =
        test_support::insert_section(ctx.state.db(), &owner.id, "Public", true).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/sections/", None, None))
        .await
        .expect("anonymous list");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    let ids: Vec<&str> =
        listed.as_array().unwrap().iter().filter_map(|item| item["id"].as_str()).collect();
    assert_eq!(ids, vec![public.id.as_str()]);

    // A malformed token is rejected outright rather than degraded.
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/sections/",
            Some("not-a-jwt"),
            None,
        ))
        .await
        .expect("bad token list");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn moderator_can_update_foreign_section() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let moderator =
        test_support::insert_moderator(ctx.state.db(), "mod@example.com", "mod-pass").await;
    let section =
        test_support::insert_section(ctx.state.db(), &owner.id, "Needs Review", false).await;
    let token = test_support::bearer_token(&moderator.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/sections/{}/update/", section.id),
            Some(&token),
            Some(json!({"title": "Reviewed", "is_public": true})),
        ))
        .await
        .expect("moderator update");

    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["title"], "Reviewed");
    assert_eq!(updated["is_public"], true);
    assert_eq!(updated["owner_id"], owner.id.as_str());
}

#[tokio::test]
async fn deleting_section_cascades_to_descendants() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let section = test_support::insert_section(ctx.state.db(), &owner.id, "Doomed", false).await;
    let material =
        test_support::insert_material(ctx.state.db(), &section, "Doomed Material", false).await;
    let exam = test_support::insert_exam(ctx.state.db(), &material, "Doomed Exam", false).await;
    let question = test_support::insert_question(ctx.state.db(), &exam, "Why?").await;
    let answer = test_support::insert_answer(ctx.state.db(), &question, "Because", true).await;
    let token = test_support::bearer_token(&owner.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/sections/{}/delete/", section.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete section");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(repositories::materials::find_by_id(ctx.state.db(), &material.id)
        .await
        .expect("material lookup")
        .is_none());
    assert!(repositories::exams::find_by_id(ctx.state.db(), &exam.id)
        .await
        .expect("exam lookup")
        .is_none());
    assert!(repositories::questions::find_by_id(ctx.state.db(), &question.id)
        .await
        .expect("question lookup")
        .is_none());
    assert!(repositories::answers::find_by_id(ctx.state.db(), &answer.id)
        .await
        .expect("answer lookup")
        .is_none());
}
