//! Bearer-token validation and the admin guard
//!
//! Tokens are issued by the auth service and verified here with the shared
//! HS256 secret. The admin guard is the single middleware rejecting
//! non-staff actors from privileged routes.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ShopError};

/// JWT claims structure, as issued by the auth service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Role indicator (0 = customer, anything else = staff)
    pub role: i16,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type
    pub token_type: TokenType,
}

/// Token type enum, mirroring the auth service
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
    Verify,
    Reset,
}

/// Authenticated actor extracted from a valid access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: i16,
}

impl AuthUser {
    /// Whether this actor may pass the admin guard
    pub fn is_admin(&self) -> bool {
        self.role != 0
    }
}

/// Verifier for access tokens issued by the auth service
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Create a verifier from the shared secret
    pub fn new(secret: &str) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Create a verifier from the `JWT_SECRET` environment variable
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        Ok(Self::new(&secret))
    }

    /// Validate an access token and return the actor it describes
    pub fn verify(&self, token: &str) -> Result<AuthUser> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let claims = token_data.claims;

        if claims.token_type != TokenType::Access {
            anyhow::bail!("not an access token");
        }

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Require a valid access token; the actor lands in the request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ShopError> {
    let token = bearer_token(&req).ok_or(ShopError::Unauthorized)?;

    let user = state
        .jwt_verifier
        .verify(token)
        .map_err(|_| ShopError::Unauthorized)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Require a valid access token belonging to a staff account
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ShopError> {
    let token = bearer_token(&req).ok_or(ShopError::Unauthorized)?;

    let user = state
        .jwt_verifier
        .verify(token)
        .map_err(|_| ShopError::Unauthorized)?;

    if !user.is_admin() {
        return Err(ShopError::Forbidden);
    }

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Attach the actor when a valid token is present, continue otherwise
///
/// Purchase creation accepts anonymous submissions with an explicit
/// `user_id`, so it cannot demand a token outright.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req)
        && let Ok(user) = state.jwt_verifier.verify(token)
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serial_test::serial;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "test-secret-do-not-use-in-production";

    #[test]
    #[serial]
    fn test_verifier_from_env() {
        unsafe {
            std::env::set_var("JWT_SECRET", SECRET);
        }

        let verifier = JwtVerifier::from_env().unwrap();
        assert!(
            verifier
                .verify(&token(0, TokenType::Access, SECRET))
                .is_ok()
        );

        unsafe {
            std::env::remove_var("JWT_SECRET");
        }

        assert!(JwtVerifier::from_env().is_err());
    }

    fn token(role: i16, token_type: TokenType, secret: &str) -> String {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role,
            iat,
            exp: iat + 900,
            token_type,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_accepts_access_token() {
        let verifier = JwtVerifier::new(SECRET);

        let user = verifier.verify(&token(0, TokenType::Access, SECRET)).unwrap();
        assert!(!user.is_admin());

        let staff = verifier.verify(&token(1, TokenType::Access, SECRET)).unwrap();
        assert!(staff.is_admin());
    }

    #[test]
    fn test_verify_rejects_other_token_types() {
        let verifier = JwtVerifier::new(SECRET);

        assert!(verifier.verify(&token(1, TokenType::Refresh, SECRET)).is_err());
        assert!(verifier.verify(&token(1, TokenType::Verify, SECRET)).is_err());
        assert!(verifier.verify(&token(1, TokenType::Reset, SECRET)).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = JwtVerifier::new(SECRET);
        assert!(
            verifier
                .verify(&token(1, TokenType::Access, "another-secret"))
                .is_err()
        );
    }
}
