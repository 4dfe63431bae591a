//! Repositories for database operations

use thiserror::Error;

pub mod buy;
pub mod cloth;
pub mod storage;

pub use buy::{BuyRepository, NewBuy};
pub use cloth::ClothRepository;
pub use storage::StorageRepository;

/// Errors surfaced by the repositories
///
/// Variants other than `Database` describe domain outcomes the handlers
/// turn into structured responses.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A foreign reference in the input does not resolve
    #[error("The selected {0} is invalid")]
    InvalidReference(&'static str),

    /// The addressed entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The cloth has no primary storage record
    #[error("Storage not found")]
    StorageNotFound,

    /// The requested quantity exceeds the remaining stock
    #[error("Storage quantity exceeded")]
    InsufficientStock,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
