//! Purchase routes

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::ShopError,
    middleware::AuthUser,
    models::{BuyListQuery, BuyListResponse, CreateBuyRequest, UpdateBuyRequest},
    repositories::NewBuy,
};

/// Create a purchase
///
/// The buyer is the explicit `user_id` when given (staff entry), otherwise
/// the authenticated actor. The storage decrement and the insert commit
/// together; on any failure nothing is written.
pub async fn create_buy(
    State(state): State<AppState>,
    actor: Option<Extension<AuthUser>>,
    Json(payload): Json<CreateBuyRequest>,
) -> Result<impl IntoResponse, ShopError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ShopError::Validation(errors));
    }

    let user_id = match payload.user_id.or(actor.map(|Extension(user)| user.id)) {
        Some(user_id) => user_id,
        None => {
            return Err(ShopError::Validation(vec![
                "The user id is required".to_string(),
            ]));
        }
    };

    if !state.buy_repository.user_exists(user_id).await? {
        return Err(ShopError::Validation(vec![
            "The selected user id is invalid".to_string(),
        ]));
    }

    let input = NewBuy {
        user_id,
        cloth_id: payload.cloth_id,
        quantity: payload.quantity,
        payment_method: payload.payment_method.clone(),
    };

    let buy = state.buy_repository.create(&input).await?;

    Ok((StatusCode::CREATED, Json(json!({ "buy": buy }))))
}

/// Apply a partial update to a purchase
pub async fn update_buy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBuyRequest>,
) -> Result<impl IntoResponse, ShopError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(ShopError::Validation(errors));
    }

    let buy = state.buy_repository.update(id, &payload).await?;

    Ok((StatusCode::CREATED, Json(json!({ "buy": buy }))))
}

/// Mark a purchase as paid
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ShopError> {
    let confirmed = state.buy_repository.confirm_payment(id).await?;

    if !confirmed {
        return Err(ShopError::NotFound("Buy"));
    }

    info!("Payment confirmed for buy: {}", id);

    Ok(Json(json!({ "message": "Successfully Confirmed" })))
}

/// Delete a purchase, returning its quantity to stock
pub async fn delete_buy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ShopError> {
    let deleted = state.buy_repository.delete(id).await?;

    if !deleted {
        return Err(ShopError::NotFound("Buy"));
    }

    Ok(Json(json!({ "message": "Successfully Deleted" })))
}

/// Fetch a purchase by ID
pub async fn get_buy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ShopError> {
    let buy = state
        .buy_repository
        .find_by_id(id)
        .await?
        .ok_or(ShopError::NotFound("Buy"))?;

    Ok(Json(json!({ "buy": buy })))
}

/// List purchases, paginated (admin view)
///
/// Optional `user_id` scopes the listing to one user; the attribute
/// filters narrow it further.
pub async fn list_buys(
    State(state): State<AppState>,
    Query(query): Query<BuyListQuery>,
) -> Result<impl IntoResponse, ShopError> {
    let filter = query.filter();
    let errors = filter.validate();
    if !errors.is_empty() {
        return Err(ShopError::Validation(errors));
    }

    let page = query.page();
    let (buys, total) = state
        .buy_repository
        .list(query.user_id, &filter, page)
        .await?;

    Ok(Json(json!({
        "buys": BuyListResponse::new(buys, page, total)
    })))
}

/// List the authenticated customer's purchases with filters, paginated
pub async fn list_my_buys(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<BuyListQuery>,
) -> Result<impl IntoResponse, ShopError> {
    let filter = query.filter();
    let errors = filter.validate();
    if !errors.is_empty() {
        return Err(ShopError::Validation(errors));
    }

    let page = query.page();
    let (buys, total) = state
        .buy_repository
        .list(Some(actor.id), &filter, page)
        .await?;

    Ok(Json(json!({
        "buys": BuyListResponse::new(buys, page, total)
    })))
}
