//! Application state shared across handlers

use sqlx::PgPool;

use crate::middleware::JwtVerifier;
use crate::repositories::{BuyRepository, ClothRepository, StorageRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub cloth_repository: ClothRepository,
    pub storage_repository: StorageRepository,
    pub buy_repository: BuyRepository,
    pub jwt_verifier: JwtVerifier,
}
