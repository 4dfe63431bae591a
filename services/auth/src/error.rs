//! Error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Error type for the authentication service
#[derive(Error, Debug)]
pub enum AuthError {
    /// One or more inputs failed validation
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Bad credentials or unverified account; deliberately indistinguishable
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Referenced entity absent
    #[error("Not found")]
    NotFound,

    /// Too many attempts from one client
    #[error("Too many attempts")]
    RateLimited,

    /// Unexpected failure; detail is logged, not exposed
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(ref e) = self {
            tracing::error!(error = %e, "Auth request error");
        }

        let (status, body) = match self {
            AuthError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "errors": errors }))
            }
            AuthError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Authentication failed" }),
            ),
            AuthError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
            }
            AuthError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Not found" }),
            ),
            AuthError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": "Too many attempts, try again later" }),
            ),
            AuthError::Internal(_) => (
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

    fn status_of(err: AuthError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(AuthError::Validation(vec!["bad".into()])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AuthError::AuthenticationFailed),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(AuthError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AuthError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(AuthError::Internal(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_credentials_and_unverified_share_one_shape() {
        // Both conditions must collapse into the same variant so the
        // response cannot be used to probe which accounts exist.
        let a = AuthError::AuthenticationFailed.into_response();
        let b = AuthError::AuthenticationFailed.into_response();
        assert_eq!(a.status(), b.status());
    }
}
