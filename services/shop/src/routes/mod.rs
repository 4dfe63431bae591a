//! Shop service routes
//!
//! Catalog reads are public. Inventory mutations and cross-user purchase
//! listings sit behind the admin guard; the self-service listing only
//! needs a valid token. Purchase creation takes an optional token so staff
//! and anonymous API clients can submit purchases with an explicit
//! `user_id`.

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::json;

use crate::AppState;
use crate::middleware::{admin_middleware, auth_middleware, optional_auth_middleware};

pub mod buys;
pub mod clothes;
pub mod storages;

/// Create the router for the shop service
pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/clothes", post(clothes::create_cloth))
        .route("/clothes/:id", post(clothes::update_cloth))
        .route("/clothes/:id", delete(clothes::delete_cloth))
        .route(
            "/clothes/:id/stock/:storage_id",
            post(clothes::update_stock),
        )
        .route("/storages", post(storages::create_storage))
        .route("/storages", get(storages::list_storages))
        .route("/storages/:id", post(storages::update_storage))
        .route("/storages/:id", get(storages::get_storage))
        .route("/storages/:id", delete(storages::delete_storage))
        .route("/buys", get(buys::list_buys))
        .route("/buy/:id", get(buys::get_buy))
        .route("/buy/:id", post(buys::update_buy))
        .route("/buy/:id", delete(buys::delete_buy))
        .route("/buy/:id/confirm", post(buys::confirm_payment))
        .route_layer(from_fn_with_state(state.clone(), admin_middleware));

    let customer_routes = Router::new()
        .route("/buys/me", get(buys::list_my_buys))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let purchase_routes = Router::new()
        .route("/buy", post(buys::create_buy))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/clothes", get(clothes::list_cloths))
        .route("/clothes/:id", get(clothes::get_cloth))
        .route("/clothes/:id/quantity", get(clothes::get_cloth_quantity))
        .merge(admin_routes)
        .merge(customer_routes)
        .merge(purchase_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "shop-service"
    }))
}
