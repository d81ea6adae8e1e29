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
use crate::db::models::{Material, Section};
use crate::repositories;
use crate::schemas::section::{SectionCreate, SectionResponse, SectionUpdate};
use crate::services::authorization::{authorize, Action};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/sections/create/", post(create))
        .route("/sections/", get(list))
        .route("/sections/:id/", get(retrieve))
        .route("/sections/:id/update/", put(update))
        .route("/sections/:id/delete/", delete(remove))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<SectionCreate>,
) -> Result<(StatusCode, Json<SectionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let section = repositories::sections::create(
        state.db(),
        repositories::sections::CreateSection {
            id: &Uuid::new_v4().to_string(),
            title: &payload.title,
            description: payload.description.as_deref(),
            owner_id: &user.id,
            is_public: payload.is_public,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create section"))?;

    Ok((StatusCode::CREATED, Json(SectionResponse::from_db(section, Vec::new()))))
}

async fn list(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Json<Vec<SectionResponse>>, ApiError> {
    let viewer_id = viewer.as_ref().map(|user| user.id.as_str());
    let sections = repositories::sections::list_visible(state.db(), viewer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list sections"))?;

    let responses = with_materials(&state, sections).await?;
    Ok(Json(responses))
}

async fn retrieve(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(section_id): Path<String>,
) -> Result<Json<SectionResponse>, ApiError> {
    let section = fetch_section(&state, &section_id).await?;

    authorize(&user, &section.owner_id, Action::View)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    let materials =
        repositories::materials::list_by_section_ids(state.db(), &[section.id.clone()])
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load materials"))?;

    Ok(Json(SectionResponse::from_db(section, materials)))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(section_id): Path<String>,
    Json(payload): Json<SectionUpdate>,
) -> Result<Json<SectionResponse>, ApiError> {
    let section = fetch_section(&state, &section_id).await?;

    authorize(&user, &section.owner_id, Action::Update)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::sections::update(
        state.db(),
        &section.id,
        repositories::sections::UpdateSection {
            title: payload.title,
            description: payload.description,
            is_public: payload.is_public,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update section"))?;

    let section = repositories::sections::fetch_one_by_id(state.db(), &section.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload section"))?;
    let materials =
        repositories::materials::list_by_section_ids(state.db(), &[section.id.clone()])
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load materials"))?;

    Ok(Json(SectionResponse::from_db(section, materials)))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(section_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let section = fetch_section(&state, &section_id).await?;

    authorize(&user, &section.owner_id, Action::Delete)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    repositories::sections::delete(state.db(), &section.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete section"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_section(state: &AppState, section_id: &str) -> Result<Section, ApiError> {
    repositories::sections::find_by_id(state.db(), section_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch section"))?
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))
}

async fn with_materials(
    state: &AppState,
    sections: Vec<Section>,
) -> Result<Vec<SectionResponse>, ApiError> {
    let section_ids: Vec<String> = sections.iter().map(|section| section.id.clone()).collect();
    let materials = repositories::materials::list_by_section_ids(state.db(), &section_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load materials"))?;

    let mut by_section: HashMap<String, Vec<Material>> = HashMap::new();
    for material in materials {
        by_section.entry(material.section_id.clone()).or_default().push(material);
    }

    Ok(sections
        .into_iter()
        .map(|section| {
            let materials = by_section.remove(&section.id).unwrap_or_default();
            SectionResponse::from_db(section, materials)
        })
        .collect())
}

#[cfg(test)]
mod tests;
