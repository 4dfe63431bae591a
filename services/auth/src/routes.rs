//! Authentication service routes

use axum::{
    Json, Router,
    extract::{Extension, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    AppState,
    error::AuthError,
    jwt::{TokenType, now_ts},
    middleware::auth_middleware,
    models::{LoginCredentials, NewUser, UserProfile},
    repositories::CreateUserError,
    validation,
};

/// Response for a successful registration
#[derive(Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Response for token issuance on login
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Query for the emailed verification link
#[derive(Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

/// Request to resend the verification email
#[derive(Deserialize)]
pub struct ResendVerificationRequest {
    pub user_id: Uuid,
}

/// Request carrying a refresh token (logout)
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Request for a password change by an authenticated user
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

/// Request for a password-reset link
#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request completing a password reset
#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(me))
        .route("/auth/password", post(change_password))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/verify", get(verify_email))
        .route("/auth/verify/resend", post(resend_verification))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/password/forgot", post(forgot_password))
        .route("/auth/password/reset", post(reset_password))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Register a new customer account
///
/// Creates the user unverified and emails a signed 10-minute verification
/// link.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Registration attempt for email: {}", payload.email);

    let mut errors = Vec::new();

    for check in [
        validation::validate_name(&payload.name),
        validation::validate_email(&payload.email),
        validation::validate_password(&payload.password),
        validation::validate_address(&payload.address),
        validation::validate_number(&payload.number),
    ] {
        if let Err(message) = check {
            errors.push(message);
        }
    }

    // Uniqueness checks only make sense for well-formed values.
    if errors.is_empty() {
        if state.user_repository.email_exists(&payload.email).await? {
            errors.push("The email has already been taken".to_string());
        }
        if state.user_repository.number_exists(&payload.number).await? {
            errors.push("The number has already been taken".to_string());
        }
    }

    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let user = match state.user_repository.create(&payload).await {
        Ok(user) => user,
        Err(e @ (CreateUserError::EmailTaken | CreateUserError::NumberTaken)) => {
            return Err(AuthError::Validation(vec![e.to_string()]));
        }
        Err(CreateUserError::Other(e)) => return Err(AuthError::Internal(e)),
    };

    let token = state.jwt_service.generate_verification_token(&user)?;
    state
        .mailer
        .send_verification_link(&user.email, &token)
        .await
        .map_err(|e| AuthError::Internal(e.into()))?;

    let response = RegisterResponse {
        user_id: user.id,
        message: "Registered, check your email to verify the account".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Consume the signed verification link
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<impl IntoResponse, AuthError> {
    let claims = state
        .jwt_service
        .validate_token(&query.token)
        .map_err(|_| AuthError::Unauthorized)?;

    if claims.token_type != TokenType::Verify {
        return Err(AuthError::Unauthorized);
    }

    let verified = state.user_repository.mark_email_verified(claims.sub).await?;

    if !verified {
        // Surfaced to the operator; the caller only gets a generic 404.
        error!("User {} not found during email verification", claims.sub);
        return Err(AuthError::NotFound);
    }

    Ok(Json(json!({ "message": "Email verified, you can log in now" })))
}

/// Resend the verification email
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(payload): Json<ResendVerificationRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let user = match state.user_repository.find_by_id(payload.user_id).await? {
        Some(user) => user,
        None => return Ok(Json(json!({ "message": "Failed" }))),
    };

    let token = state.jwt_service.generate_verification_token(&user)?;
    state
        .mailer
        .send_verification_link(&user.email, &token)
        .await
        .map_err(|e| AuthError::Internal(e.into()))?;

    Ok(Json(json!({ "message": "Success" })))
}

/// User login
///
/// A missing account, a wrong password, and an unverified account are all
/// rejected with the same response.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginCredentials>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Login attempt for email: {}", payload.email);

    let mut errors = Vec::new();
    if let Err(message) = validation::validate_email(&payload.email) {
        errors.push(message);
    }
    if payload.password.is_empty() {
        errors.push("Password is required".to_string());
    }
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let rate_key = payload.email.to_lowercase();
    if !state.rate_limiter.is_allowed(&rate_key).await {
        return Err(AuthError::RateLimited);
    }

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await?
        .ok_or(AuthError::AuthenticationFailed)?;

    if !state.user_repository.verify_password(&user, &payload.password)? {
        return Err(AuthError::AuthenticationFailed);
    }

    if !user.is_verified() {
        // Tear down anything established for this user before rejecting.
        state.session_manager.delete_session(user.id).await?;
        return Err(AuthError::AuthenticationFailed);
    }

    let access_token = state.jwt_service.generate_access_token(&user)?;
    let refresh_token = state.jwt_service.generate_refresh_token(&user)?;

    state
        .session_manager
        .create_session(user.id, &refresh_token)
        .await?;

    let response = TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    };

    Ok(Json(response))
}

/// Logout: blacklist the refresh token and drop the session
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token)
        .map_err(|_| AuthError::Unauthorized)?;

    if claims.token_type != TokenType::Refresh {
        return Err(AuthError::Unauthorized);
    }

    let remaining = claims.exp.saturating_sub(now_ts()?);
    state
        .jwt_service
        .blacklist_token(&state.redis_pool, &payload.refresh_token, remaining)
        .await?;

    state.session_manager.delete_session(claims.sub).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// Return the authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state
        .user_repository
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    Ok(Json(UserProfile::from(user)))
}

/// Change the authenticated user's password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    if let Err(message) = validation::validate_password(&payload.password) {
        return Err(AuthError::Validation(vec![message]));
    }

    let updated = state
        .user_repository
        .update_password(user_id, &payload.password)
        .await?;

    if !updated {
        return Err(AuthError::NotFound);
    }

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// Request a password-reset link
///
/// The email must belong to a registered account; a signed 10-minute reset
/// link is mailed to it.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    if let Err(message) = validation::validate_email(&payload.email) {
        return Err(AuthError::Validation(vec![message]));
    }

    let rate_key = format!("forgot:{}", payload.email.to_lowercase());
    if !state.rate_limiter.is_allowed(&rate_key).await {
        return Err(AuthError::RateLimited);
    }

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| {
            AuthError::Validation(vec!["The selected email is invalid".to_string()])
        })?;

    let token = state.jwt_service.generate_reset_token(&user)?;
    state
        .mailer
        .send_password_reset_link(&user.email, &token)
        .await
        .map_err(|e| AuthError::Internal(e.into()))?;

    Ok(Json(json!({ "message": "Password reset link sent" })))
}

/// Complete a password reset with the emailed token
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let claims = state
        .jwt_service
        .validate_token(&payload.token)
        .map_err(|_| AuthError::Unauthorized)?;

    if claims.token_type != TokenType::Reset {
        return Err(AuthError::Unauthorized);
    }

    // Reset tokens are single use.
    if state
        .jwt_service
        .is_token_blacklisted(&state.redis_pool, &payload.token)
        .await?
    {
        return Err(AuthError::Unauthorized);
    }

    if let Err(message) = validation::validate_password(&payload.password) {
        return Err(AuthError::Validation(vec![message]));
    }

    let updated = state
        .user_repository
        .update_password(claims.sub, &payload.password)
        .await?;

    if !updated {
        error!("User {} not found during password reset", claims.sub);
        return Err(AuthError::NotFound);
    }

    let remaining = claims.exp.saturating_sub(now_ts()?);
    state
        .jwt_service
        .blacklist_token(&state.redis_pool, &payload.token, remaining)
        .await?;

    Ok(Json(json!({ "message": "Password updated successfully" })))
}
