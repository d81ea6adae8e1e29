use std::collections::HashMap;

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
use crate::db::models::{Answer, Exam};
use crate::repositories;
use crate::schemas::exam::{ExamCreate, ExamResponse, ExamUpdate};
use crate::schemas::question::QuestionResponse;
use crate::schemas::submission::{SubmissionRequest, SubmissionResponse};
use crate::services::authorization::{authorize, Action};
use crate::services::scoring::{score_submission, ScoringError};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/exams/create/", post(create))
        .route("/exams/", get(list))
        .route("/exams/:id/", get(retrieve))
        .route("/exams/:id/update/", put(update))
        .route("/exams/:id/delete/", delete(remove))
        .route("/exams/:id/submit/", post(submit))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ExamCreate>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let material = repositories::materials::find_by_id(state.db(), &payload.material_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch material"))?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))?;

    if material.owner_id != user.id {
        return Err(ApiError::Forbidden("You can only add exams to your own materials"));
    }

    let now = primitive_now_utc();
    let exam = repositories::exams::create(
        state.db(),
        repositories::exams::CreateExam {
            id: &Uuid::new_v4().to_string(),
            material_id: &material.id,
            owner_id: &user.id,
            title: &payload.title,
            description: payload.description.as_deref(),
            is_public: payload.is_public,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    Ok((StatusCode::CREATED, Json(ExamResponse::from_db(exam, Vec::new()))))
}

async fn list(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    let viewer_id = viewer.as_ref().map(|user| user.id.as_str());
    let exams = repositories::exams::list_visible(state.db(), viewer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    let exam_ids: Vec<String> = exams.iter().map(|exam| exam.id.clone()).collect();
    let mut questions_by_exam = load_question_tree(&state, &exam_ids).await?;

    let responses = exams
        .into_iter()
        .map(|exam| {
            let questions = questions_by_exam.remove(&exam.id).unwrap_or_default();
            ExamResponse::from_db(exam, questions)
        })
        .collect();

    Ok(Json(responses))
}

async fn retrieve(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = fetch_exam(&state, &exam_id).await?;

    authorize(&user, &exam.owner_id, Action::View)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    let mut questions_by_exam = load_question_tree(&state, &[exam.id.clone()]).await?;
    let questions = questions_by_exam.remove(&exam.id).unwrap_or_default();

    Ok(Json(ExamResponse::from_db(exam, questions)))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(exam_id): Path<String>,
    Json(payload): Json<ExamUpdate>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = fetch_exam(&state, &exam_id).await?;

    authorize(&user, &exam.owner_id, Action::Update)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::exams::update(
        state.db(),
        &exam.id,
        repositories::exams::UpdateExam {
            title: payload.title,
            description: payload.description,
            is_public: payload.is_public,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam"))?;

    let exam = repositories::exams::fetch_one_by_id(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload exam"))?;
    let mut questions_by_exam = load_question_tree(&state, &[exam.id.clone()]).await?;
    let questions = questions_by_exam.remove(&exam.id).unwrap_or_default();

    Ok(Json(ExamResponse::from_db(exam, questions)))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(exam_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let exam = fetch_exam(&state, &exam_id).await?;

    authorize(&user, &exam.owner_id, Action::Delete)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    repositories::exams::delete(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Any authenticated user may submit answers; the exam's visibility flag is
/// not consulted here.
async fn submit(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(exam_id): Path<String>,
    Json(payload): Json<SubmissionRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let exam = fetch_exam(&state, &exam_id).await?;

    let keys = repositories::questions::scoring_keys(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam questions"))?;

    let score = score_submission(&keys, &payload.answers).map_err(|err| match err {
        ScoringError::NoQuestions => ApiError::BadRequest(err.to_string()),
    })?;

    Ok(Json(SubmissionResponse::from_score(score)))
}

async fn fetch_exam(state: &AppState, exam_id: &str) -> Result<Exam, ApiError> {
    repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

/// Batched question + answer fetch for a set of exams, grouped per exam.
async fn load_question_tree(
    state: &AppState,
    exam_ids: &[String],
) -> Result<HashMap<String, Vec<QuestionResponse>>, ApiError> {
    let questions = repositories::questions::list_by_exam_ids(state.db(), exam_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;

    let question_ids: Vec<String> = questions.iter().map(|question| question.id.clone()).collect();
    let answers = repositories::answers::list_by_question_ids(state.db(), &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load answers"))?;

    let mut answers_by_question: HashMap<String, Vec<Answer>> = HashMap::new();
    for answer in answers {
        answers_by_question.entry(answer.question_id.clone()).or_default().push(answer);
    }

    let mut questions_by_exam: HashMap<String, Vec<QuestionResponse>> = HashMap::new();
    for question in questions {
        let answers = answers_by_question.remove(&question.id).unwrap_or_default();
        questions_by_exam
            .entry(question.exam_id.clone())
            .or_default()
            .push(QuestionResponse::from_db(question, answers));
    }

    Ok(questions_by_exam)
}
