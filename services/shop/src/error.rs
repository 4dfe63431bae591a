//! Error types for the shop service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::RepositoryError;

/// Error type for the shop service
#[derive(Error, Debug)]
pub enum ShopError {
    /// One or more inputs failed validation
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Referenced entity absent
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The cloth has no primary storage record to sell from
    #[error("Storage not found")]
    StorageNotFound,

    /// The requested quantity exceeds the remaining stock
    #[error("Storage quantity exceeded")]
    StorageQuantityExceeded,

    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not staff
    #[error("Forbidden")]
    Forbidden,

    /// Unexpected failure; detail is logged, not exposed
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<RepositoryError> for ShopError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::InvalidReference(what) => {
                ShopError::Validation(vec![format!("The selected {what} is invalid")])
            }
            RepositoryError::NotFound(what) => ShopError::NotFound(what),
            RepositoryError::StorageNotFound => ShopError::StorageNotFound,
            RepositoryError::InsufficientStock => ShopError::StorageQuantityExceeded,
            RepositoryError::Database(e) => ShopError::Internal(e.into()),
        }
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        if let ShopError::Internal(ref e) = self {
            tracing::error!(error = %e, "Shop request error");
        }

        let (status, body) = match self {
            ShopError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "errors": errors }))
            }
            ShopError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("{what} not found") }),
            ),
            ShopError::StorageNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Storage not found" }),
            ),
            ShopError::StorageQuantityExceeded => (
                StatusCode::CONFLICT,
                json!({ "message": "Storage quantity exceeded" }),
            ),
            ShopError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
            }
            ShopError::Forbidden => (StatusCode::FORBIDDEN, json!({ "error": "Forbidden" })),
            ShopError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ShopError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(ShopError::Validation(vec!["bad".into()])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(ShopError::NotFound("Buy")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ShopError::StorageNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ShopError::StorageQuantityExceeded),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(ShopError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ShopError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(ShopError::Internal(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            ShopError::from(RepositoryError::InsufficientStock),
            ShopError::StorageQuantityExceeded
        ));
        assert!(matches!(
            ShopError::from(RepositoryError::StorageNotFound),
            ShopError::StorageNotFound
        ));
        assert!(matches!(
            ShopError::from(RepositoryError::NotFound("Buy")),
            ShopError::NotFound("Buy")
        ));
        match ShopError::from(RepositoryError::InvalidReference("cloth id")) {
            ShopError::Validation(errors) => {
                assert_eq!(errors, vec!["The selected cloth id is invalid".to_string()]);
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
