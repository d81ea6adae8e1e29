use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn owner_can_create_answer_on_own_question() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let section = test_support::insert_section(ctx.state.db(), &owner.id, "Calculus", false).await;
    let material =
        test_support::insert_material(ctx.state.db(), &section, "Derivatives", false).await;
    let exam = test_support::insert_exam(ctx.state.db(), &material, "Midterm", false).await;
    let question = test_support::insert_question(ctx.state.db(), &exam, "2 + 2?").await;
    let token = test_support::bearer_token(&owner.id, ctx.state.settings());

    let payload = json!({
        "question_id": question.id,
        "text": "4",
        "is_correct": true
    });

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/answers/create/",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("create answer");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["question_id"], question.id.as_str());
    assert_eq!(created["is_correct"], true);
}

#[tokio::test]
async fn create_on_foreign_question_is_forbidden() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let intruder =
        test_support::insert_user(ctx.state.db(), "intruder@example.com", "intruder-pass").await;
    let section = test_support::insert_section(ctx.state.db(), &owner.id, "Calculus", true).await;
    let material =
        test_support::insert_material(ctx.state.db(), &section, "Derivatives", true).await;
    let exam = test_support::insert_exam(ctx.state.db(), &material, "Midterm", true).await;
    let question = test_support::insert_question(ctx.state.db(), &exam, "2 + 2?").await;
    let token = test_support::bearer_token(&intruder.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/answers/create/",
            Some(&token),
            Some(json!({"question_id": question.id, "text": "5", "is_correct": true})),
        ))
        .await
        .expect("create answer");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_follows_exam_visibility() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let stranger =
        test_support::insert_user(ctx.state.db(), "stranger@example.com", "stranger-pass").await;
    let section = test_support::insert_section(ctx.state.db(), &owner.id, "Calculus", false).await;
    let material =
        test_support::insert_material(ctx.state.db(), &section, "Derivatives", false).await;

    let public_exam = test_support::insert_exam(ctx.state.db(), &material, "Open", true).await;
    let public_question =
        test_support::insert_question(ctx.state.db(), &public_exam, "Visible?").await;
    let public_answer =
        test_support::insert_answer(ctx.state.db(), &public_question, "yes", true).await;

    let private_exam = test_support::insert_exam(ctx.state.db(), &material, "Closed", false).await;
    let private_question =
        test_support::insert_question(ctx.state.db(), &private_exam, "Hidden?").await;
    test_support::insert_answer(ctx.state.db(), &private_question, "no", false).await;

    let token = test_support::bearer_token(&stranger.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/answers/", Some(&token), None))
        .await
        .expect("list answers");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    let ids: Vec<&str> =
        listed.as_array().unwrap().iter().filter_map(|item| item["id"].as_str()).collect();
    assert_eq!(ids, vec![public_answer.id.as_str()]);
    assert_eq!(listed[0]["is_correct"], true);
}

#[tokio::test]
async fn owner_can_toggle_correctness() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "owner-pass").await;
    let section = test_support::insert_section(ctx.state.db(), &owner.id, "Calculus", false).await;
    let material =
        test_support::insert_material(ctx.state.db(), &section, "Derivatives", false).await;
    let exam = test_support::insert_exam(ctx.state.db(), &material, "Midterm", false).await;
    let question = test_support::insert_question(ctx.state.db(), &exam, "2 + 2?").await;
    let answer = test_support::insert_answer(ctx.state.db(), &question, "5", false).await;
    let token = test_support::bearer_token(&owner.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/answers/{}/update/", answer.id),
            Some(&token),
            Some(json!({"text": "4", "is_correct": true})),
        ))
        .await
        .expect("update answer");

    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["text"], "4");
    assert_eq!(updated["is_correct"], true);
    assert_eq!(updated["question_id"], question.id.as_str());
}
