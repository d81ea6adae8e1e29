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
use crate::db::models::Question;
use crate::repositories;
use crate::schemas::question::{QuestionCreate, QuestionResponse, QuestionUpdate};
use crate::services::authorization::{authorize, Action};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/questions/create/", post(create))
        .route("/questions/", get(list))
        .route("/questions/:id/", get(retrieve))
        .route("/questions/:id/update/", put(update))
        .route("/questions/:id/delete/", delete(remove))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam = repositories::exams::find_by_id(state.db(), &payload.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    if exam.owner_id != user.id {
        return Err(ApiError::Forbidden("You can only add questions to your own exams"));
    }

    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            exam_id: &exam.id,
            text: &payload.text,
            is_multiple_choice: payload.is_multiple_choice,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question, Vec::new()))))
}

async fn list(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let viewer_id = viewer.as_ref().map(|user| user.id.as_str());
    let questions = repositories::questions::list_visible(state.db(), viewer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    with_answers(&state, questions).await.map(Json)
}

async fn retrieve(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(question_id): Path<String>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = fetch_question(&state, &question_id).await?;
    let owner_id = effective_owner(&state, &question.id).await?;

    authorize(&user, &owner_id, Action::View)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    let answers =
        repositories::answers::list_by_question_ids(state.db(), &[question.id.clone()])
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load answers"))?;

    Ok(Json(QuestionResponse::from_db(question, answers)))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(question_id): Path<String>,
    Json(payload): Json<QuestionUpdate>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = fetch_question(&state, &question_id).await?;
    let owner_id = effective_owner(&state, &question.id).await?;

    authorize(&user, &owner_id, Action::Update)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::questions::update(
        state.db(),
        &question.id,
        repositories::questions::UpdateQuestion {
            text: payload.text,
            is_multiple_choice: payload.is_multiple_choice,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?;

    let question = repositories::questions::fetch_one_by_id(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload question"))?;
    let answers =
        repositories::answers::list_by_question_ids(state.db(), &[question.id.clone()])
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load answers"))?;

    Ok(Json(QuestionResponse::from_db(question, answers)))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(question_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let question = fetch_question(&state, &question_id).await?;
    let owner_id = effective_owner(&state, &question.id).await?;

    authorize(&user, &owner_id, Action::Delete)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    repositories::questions::delete(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_question(state: &AppState, question_id: &str) -> Result<Question, ApiError> {
    repositories::questions::find_by_id(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}

async fn effective_owner(state: &AppState, question_id: &str) -> Result<String, ApiError> {
    repositories::questions::find_effective_owner(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve question owner"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}

async fn with_answers(
    state: &AppState,
    questions: Vec<Question>,
) -> Result<Vec<QuestionResponse>, ApiError> {
    use std::collections::HashMap;

    let question_ids: Vec<String> = questions.iter().map(|question| question.id.clone()).collect();
    let answers = repositories::answers::list_by_question_ids(state.db(), &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load answers"))?;

    let mut by_question: HashMap<String, Vec<crate::db::models::Answer>> = HashMap::new();
    for answer in answers {
        by_question.entry(answer.question_id.clone()).or_default().push(answer);
    }

    Ok(questions
        .into_iter()
        .map(|question| {
            let answers = by_question.remove(&question.id).unwrap_or_default();
            QuestionResponse::from_db(question, answers)
        })
        .collect())
}
