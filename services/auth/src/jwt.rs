//! JWT service for token generation, validation, and management
//!
//! Tokens are signed with HS256. Besides the usual access/refresh pair,
//! the service issues short-lived `Verify` and `Reset` tokens which back
//! the signed temporary links sent by email.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use common::cache::RedisPool;

use crate::models::User;

/// Lifetime of the signed verification/reset links, in seconds
pub const LINK_TOKEN_EXPIRY: u64 = 600; // 10 minutes

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HS256 signing secret
    pub secret: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: HS256 signing secret shared with the shop service
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string()) // 15 minutes
            .parse()
            .unwrap_or(900);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string()) // 7 days
            .parse()
            .unwrap_or(604800);

        Ok(JwtConfig {
            secret,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// JWT claims structure
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

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
    /// Email verification link token
    Verify,
    /// Password reset link token
    Reset,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        self.generate_token(user, TokenType::Access, self.config.access_token_expiry)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user: &User) -> Result<String> {
        self.generate_token(user, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    /// Generate the signed email-verification link token (10-minute expiry)
    pub fn generate_verification_token(&self, user: &User) -> Result<String> {
        self.generate_token(user, TokenType::Verify, LINK_TOKEN_EXPIRY)
    }

    /// Generate the signed password-reset link token (10-minute expiry)
    pub fn generate_reset_token(&self, user: &User) -> Result<String> {
        self.generate_token(user, TokenType::Reset, LINK_TOKEN_EXPIRY)
    }

    fn generate_token(&self, user: &User, token_type: TokenType, expiry: u64) -> Result<String> {
        let iat = now_ts()?;
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat,
            exp: iat + expiry,
            token_type,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Blacklist a token for the remainder of its lifetime
    pub async fn blacklist_token(
        &self,
        redis_pool: &RedisPool,
        token: &str,
        ttl_seconds: u64,
    ) -> Result<()> {
        let key = format!("blacklist:{}", token);
        redis_pool.set(&key, "1", Some(ttl_seconds.max(1))).await?;
        Ok(())
    }

    /// Check whether a token has been blacklisted
    pub async fn is_token_blacklisted(&self, redis_pool: &RedisPool, token: &str) -> Result<bool> {
        let key = format!("blacklist:{}", token);
        redis_pool.exists(&key).await
    }

    /// Access token expiry in seconds
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Refresh token expiry in seconds
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }
}

/// Current unix timestamp in seconds
pub fn now_ts() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("System clock error: {}", e))?
        .as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_jwt_config_from_env() {
        unsafe {
            std::env::set_var("JWT_SECRET", "test-secret");
            std::env::remove_var("JWT_ACCESS_TOKEN_EXPIRY");
            std::env::remove_var("JWT_REFRESH_TOKEN_EXPIRY");
        }

        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.secret, "test-secret");
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);

        unsafe {
            std::env::remove_var("JWT_SECRET");
        }

        assert!(JwtConfig::from_env().is_err());
    }

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-do-not-use-in-production".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
        })
    }

    fn sample_user(role: i16) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            number: "081234567890".to_string(),
            address: "Jl. Testing 1".to_string(),
            password_hash: "hash".to_string(),
            role,
            email_verified_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let svc = service();
        let user = sample_user(0);

        let token = svc.generate_access_token(&user).unwrap();
        let claims = svc.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, 0);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_link_tokens_carry_type_and_short_expiry() {
        let svc = service();
        let user = sample_user(1);

        let verify = svc.generate_verification_token(&user).unwrap();
        let claims = svc.validate_token(&verify).unwrap();
        assert_eq!(claims.token_type, TokenType::Verify);
        assert_eq!(claims.exp - claims.iat, LINK_TOKEN_EXPIRY);

        let reset = svc.generate_reset_token(&user).unwrap();
        let claims = svc.validate_token(&reset).unwrap();
        assert_eq!(claims.token_type, TokenType::Reset);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let user = sample_user(0);

        let mut token = svc.generate_access_token(&user).unwrap();
        token.push('x');
        assert!(svc.validate_token(&token).is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let svc = service();
        let other = JwtService::new(JwtConfig {
            secret: "a-different-secret".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
        });

        let token = other.generate_access_token(&sample_user(0)).unwrap();
        assert!(svc.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service();
        let user = sample_user(0);

        // Issue a token whose lifetime is already over.
        let iat = now_ts().unwrap() - 120;
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat,
            exp: iat + 30,
            token_type: TokenType::Verify,
        };
        let token = encode(&Header::default(), &claims, &svc.encoding_key).unwrap();

        assert!(svc.validate_token(&token).is_err());
    }
}
