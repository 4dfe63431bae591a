//! Cloth routes

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
    models::{CreateClothRequest, UpdateClothRequest, UpdateStorageRequest},
};

/// Create a cloth
pub async fn create_cloth(
    State(state): State<AppState>,
    Json(payload): Json<CreateClothRequest>,
) -> Result<impl IntoResponse, ShopError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ShopError::Validation(errors));
    }

    let cloth = state.cloth_repository.create(&payload).await?;

    Ok((StatusCode::CREATED, Json(json!({ "cloth": cloth }))))
}

/// Apply a partial update to a cloth
pub async fn update_cloth(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClothRequest>,
) -> Result<impl IntoResponse, ShopError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ShopError::Validation(errors));
    }

    let cloth = state.cloth_repository.update(id, &payload).await?;

    Ok(Json(json!({ "cloth": cloth })))
}

/// Edit one of the cloth's storage records
pub async fn update_stock(
    State(state): State<AppState>,
    Path((id, storage_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateStorageRequest>,
) -> Result<impl IntoResponse, ShopError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ShopError::Validation(errors));
    }

    let storage = state
        .storage_repository
        .update_for_cloth(id, storage_id, &payload)
        .await?;

    Ok(Json(json!({ "storage": storage })))
}

/// Delete a cloth; its storage records go with it
pub async fn delete_cloth(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ShopError> {
    let deleted = state.cloth_repository.delete(id).await?;

    if !deleted {
        return Err(ShopError::NotFound("Cloth"));
    }

    Ok(Json(json!({ "message": "Successfully Deleted" })))
}

/// List all cloths
pub async fn list_cloths(State(state): State<AppState>) -> Result<impl IntoResponse, ShopError> {
    let cloths = state.cloth_repository.get_all().await?;

    Ok(Json(json!({ "clothes": cloths })))
}

/// Fetch a cloth by ID
pub async fn get_cloth(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ShopError> {
    let cloth = state
        .cloth_repository
        .find_by_id(id)
        .await?
        .ok_or(ShopError::NotFound("Cloth"))?;

    Ok(Json(json!({ "cloth": cloth })))
}

/// Fetch a cloth with its summed storage quantity
pub async fn get_cloth_quantity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ShopError> {
    let cloth = state
        .cloth_repository
        .find_with_total_quantity(id)
        .await?
        .ok_or(ShopError::NotFound("Cloth"))?;

    Ok(Json(json!({ "cloth": cloth })))
}
