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
use crate::db::models::Material;
use crate::repositories;
use crate::schemas::material::{MaterialCreate, MaterialResponse, MaterialUpdate};
use crate::services::authorization::{authorize, Action};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/materials/create/", post(create))
        .route("/materials/", get(list))
        .route("/materials/:id/", get(retrieve))
        .route("/materials/:id/update/", put(update))
        .route("/materials/:id/delete/", delete(remove))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<MaterialCreate>,
) -> Result<(StatusCode, Json<MaterialResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let section = repositories::sections::find_by_id(state.db(), &payload.section_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch section"))?
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))?;

    if section.owner_id != user.id {
        return Err(ApiError::Forbidden("You can only add materials to your own sections"));
    }

    let now = primitive_now_utc();
    let material = repositories::materials::create(
        state.db(),
        repositories::materials::CreateMaterial {
            id: &Uuid::new_v4().to_string(),
            section_id: &section.id,
            owner_id: &user.id,
            title: &payload.title,
            content: &payload.content,
            is_public: payload.is_public,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create material"))?;

    Ok((StatusCode::CREATED, Json(MaterialResponse::from_db(material))))
}

async fn list(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Json<Vec<MaterialResponse>>, ApiError> {
    let viewer_id = viewer.as_ref().map(|user| user.id.as_str());
    let materials = repositories::materials::list_visible(state.db(), viewer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list materials"))?;

    Ok(Json(materials.into_iter().map(MaterialResponse::from_db).collect()))
}

async fn retrieve(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(material_id): Path<String>,
) -> Result<Json<MaterialResponse>, ApiError> {
    let material = fetch_material(&state, &material_id).await?;

    authorize(&user, &material.owner_id, Action::View)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    Ok(Json(MaterialResponse::from_db(material)))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(material_id): Path<String>,
    Json(payload): Json<MaterialUpdate>,
) -> Result<Json<MaterialResponse>, ApiError> {
    let material = fetch_material(&state, &material_id).await?;

    authorize(&user, &material.owner_id, Action::Update)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    repositories::materials::update(
        state.db(),
        &material.id,
        repositories::materials::UpdateMaterial {
            title: payload.title,
            content: payload.content,
            is_public: payload.is_public,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update material"))?;

    let material = repositories::materials::fetch_one_by_id(state.db(), &material.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload material"))?;

    Ok(Json(MaterialResponse::from_db(material)))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(material_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let material = fetch_material(&state, &material_id).await?;

    authorize(&user, &material.owner_id, Action::Delete)
        .map_err(|_| ApiError::Forbidden("Not enough permissions"))?;

    repositories::materials::delete(state.db(), &material.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete material"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_material(state: &AppState, material_id: &str) -> Result<Material, ApiError> {
    repositories::materials::find_by_id(state.db(), material_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch material"))?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))
}

#[cfg(test)]
mod tests;
