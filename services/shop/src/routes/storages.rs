//! Storage routes

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    error::ShopError,
    models::{CreateStorageRequest, UpdateStorageRequest},
};

/// Create a storage record for a cloth
pub async fn create_storage(
    State(state): State<AppState>,
    Json(payload): Json<CreateStorageRequest>,
) -> Result<impl IntoResponse, ShopError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ShopError::Validation(errors));
    }

    let storage = state.storage_repository.create(&payload).await?;

    Ok((StatusCode::CREATED, Json(json!({ "storage": storage }))))
}

/// Apply a partial update to a storage record
pub async fn update_storage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStorageRequest>,
) -> Result<impl IntoResponse, ShopError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ShopError::Validation(errors));
    }

    let storage = state.storage_repository.update(id, &payload).await?;

    Ok(Json(json!({ "storage": storage })))
}

/// Delete a storage record
pub async fn delete_storage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ShopError> {
    let deleted = state.storage_repository.delete(id).await?;

    if !deleted {
        return Err(ShopError::NotFound("Storage"));
    }

    Ok(Json(json!({ "message": "Successfully Deleted" })))
}

/// List all storage records
pub async fn list_storages(State(state): State<AppState>) -> Result<impl IntoResponse, ShopError> {
    let storages = state.storage_repository.get_all().await?;

    Ok(Json(json!({ "storages": storages })))
}

/// Fetch a storage record by ID
pub async fn get_storage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ShopError> {
    let storage = state
        .storage_repository
        .find_by_id(id)
        .await?
        .ok_or(ShopError::NotFound("Storage"))?;

    Ok(Json(json!({ "storage": storage })))
}
