//! Middleware for bearer-token authentication

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::error;

use crate::{AppState, error::AuthError, jwt::TokenType};

/// Extract and validate the access token from the Authorization header
///
/// On success the authenticated user id is inserted into the request
/// extensions for handlers to pick up.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_token(token)
        .map_err(|_| AuthError::Unauthorized)?;

    if claims.token_type != TokenType::Access {
        return Err(AuthError::Unauthorized);
    }

    let is_blacklisted = state
        .jwt_service
        .is_token_blacklisted(&state.redis_pool, token)
        .await
        .map_err(|e| {
            error!("Failed to check if token is blacklisted: {}", e);
            AuthError::Internal(e)
        })?;

    if is_blacklisted {
        return Err(AuthError::Unauthorized);
    }

    req.extensions_mut().insert(claims.sub);

    Ok(next.run(req).await)
}
