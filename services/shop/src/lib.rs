//! Shop service for the butik backend
//!
//! Owns the inventory (cloths and their storages) and the purchase ("buy")
//! records. Mutating inventory routes and cross-user listings sit behind
//! the admin guard; purchases themselves may be submitted anonymously or
//! on behalf of a user by staff.

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod stock;

pub use state::AppState;
