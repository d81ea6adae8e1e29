use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentUser, MaybeUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Answer;
use crate::repositories;
use crate::schemas::answer::{AnswerCreate, AnswerResponse, AnswerUpdate};
use crate::services::authorization::{authorize, Action};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/answers/create/", post(create))
        .route("/answers/", get(list))
        .route("/answers/:id/", get(retrieve))
        .route("/answers/:id/update/", put(update))
        .route("/answers/:id/delete/", delete(remove))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<AnswerCreate>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let question = repositories::questions::find_by_id(state.db(), &payload.question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    let owner_id = repositories::questions::find_effective_owner(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve question owner"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    if owner_id != user.id {
        return Err(ApiError::Forbidden("You can only add answers to your own questions"));
    }

    let answer = repositories::answers::create(
        state.db(),
        repositories::answers::CreateAnswer {
            id: &Uuid::new_v4().to_string(),
            question_id: &question.id,
            text: &payload.text,
            is_correct: payload.is_correct,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create answer"))?;

    Ok((StatusCode::CREATED, Json(AnswerResponse::from_db(answer))))
}

async fn list(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Json<Vec<AnswerResponse>>, ApiError> {
    let viewer_id = viewer.as_ref().map(|user| user.id.as_str());
    let answers = repositories::answers::list_visible(state.db(), viewer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;

    Ok(Json(answers.into_iter().map(AnswerResponse::from_db).collect()))
}

async fn retrieve(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(answer_id): Path<String>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let answer = fetch_answer(&state, &answer_id).await?;
    let owner_id = effective_owner(&state, &answer.id).await?;

    authorize(&user, &owner_id, Action::View)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    Ok(Json(AnswerResponse::from_db(answer)))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(answer_id): Path<String>,
    Json(payload): Json<AnswerUpdate>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let answer = fetch_answer(&state, &answer_id).await?;
    let owner_id = effective_owner(&state, &answer.id).await?;

    authorize(&user, &owner_id, Action::Update)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::answers::update(
        state.db(),
        &answer.id,
        repositories::answers::UpdateAnswer {
            text: payload.text,
            is_correct: payload.is_correct,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update answer"))?;

    let answer = repositories::answers::fetch_one_by_id(state.db(), &answer.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload answer"))?;

    Ok(Json(AnswerResponse::from_db(answer)))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(answer_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let answer = fetch_answer(&state, &answer_id).await?;
    let owner_id = effective_owner(&state, &answer.id).await?;

    authorize(&user, &owner_id, Action::Delete)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    repositories::answers::delete(state.db(), &answer.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete answer"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_answer(state: &AppState, answer_id: &str) -> Result<Answer, ApiError> {
    repositories::answers::find_by_id(state.db(), answer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answer"))?
        .ok_or_else(|| ApiError::NotFound("Answer not found".to_string()))
}

async fn effective_owner(state: &AppState, answer_id: &str) -> Result<String, ApiError> {
    repositories::answers::find_effective_owner(state.db(), answer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve answer owner"))?
        .ok_or_else(|| ApiError::NotFound("Answer not found".to_string()))
}

#[cfg(test)]
mod tests;
