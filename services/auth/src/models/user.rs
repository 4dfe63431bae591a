//! User model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity
///
/// `role` is 0 for customers; any other value marks staff/admin accounts.
/// `email_verified_at` stays `None` until the verification link is consumed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub number: String,
    pub address: String,
    pub password_hash: String,
    pub role: i16,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account may pass the admin guard
    pub fn is_admin(&self) -> bool {
        self.role != 0
    }

    /// Whether the email verification link has been consumed
    pub fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }
}

/// New user registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub number: String,
}

/// User login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// User representation returned to clients, without the credential
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub number: String,
    pub address: String,
    pub role: i16,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            number: user.number,
            address: user.address,
            role: user.role,
            email_verified_at: user.email_verified_at,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: i16, verified: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            number: "081234567890".to_string(),
            address: "Jl. Testing 1".to_string(),
            password_hash: "hash".to_string(),
            role,
            email_verified_at: verified.then(Utc::now),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_zero_is_customer() {
        assert!(!sample_user(0, true).is_admin());
        assert!(sample_user(1, true).is_admin());
        assert!(sample_user(2, true).is_admin());
    }

    #[test]
    fn test_verification_flag() {
        assert!(!sample_user(0, false).is_verified());
        assert!(sample_user(0, true).is_verified());
    }

    #[test]
    fn test_profile_drops_credential() {
        let user = sample_user(0, true);
        let profile = UserProfile::from(user.clone());
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], user.email);
    }
}
