//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row, postgres::PgRow};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewUser, User};

/// Errors creating a user; uniqueness violations are surfaced separately
/// so the handler can report them the way the validator does
#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("The email has already been taken")]
    EmailTaken,

    #[error("The number has already been taken")]
    NumberTaken,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        number: row.get("number"),
        address: row.get("address"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        email_verified_at: row.get("email_verified_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const USER_COLUMNS: &str =
    "id, name, email, number, address, password_hash, role, email_verified_at, \
     created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new, unverified customer account
    ///
    /// The password is hashed here; the caller never stores plaintext.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, CreateUserError> {
        info!("Creating new user: {}", new_user.email);

        let password_hash =
            hash_password(&new_user.password).map_err(CreateUserError::Other)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, number, address, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, 0)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.number)
        .bind(&new_user.address)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // A concurrent registration can slip past the pre-checks; the
            // unique indexes are the final arbiter.
            if let sqlx::Error::Database(ref db_err) = e {
                match db_err.constraint() {
                    Some("users_email_key") => return CreateUserError::EmailTaken,
                    Some("users_number_key") => return CreateUserError::NumberTaken,
                    _ => {}
                }
            }
            CreateUserError::Other(e.into())
        })?;

        Ok(user_from_row(&row))
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Whether a user already exists with this email
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS present")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("present"))
    }

    /// Whether a user already exists with this phone number
    pub async fn number_exists(&self, number: &str) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE number = $1) AS present")
            .bind(number)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("present"))
    }

    /// Record email verification
    ///
    /// Keeps the original timestamp when the link is clicked twice.
    /// Returns false when the user no longer exists.
    pub async fn mark_email_verified(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_verified_at = COALESCE(email_verified_at, now()),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hash and overwrite a user's password
    ///
    /// Returns false when the user no longer exists.
    pub async fn update_password(&self, id: Uuid, password: &str) -> Result<bool> {
        info!("Updating password for user: {}", id);

        let password_hash = hash_password(password)?;

        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert_ne!(hash, "correct horse battery");

        let repo = UserRepository {
            pool: PgPool::connect_lazy("postgresql://localhost/unused").unwrap(),
        };
        let user = User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            number: "081234567890".to_string(),
            address: "Jl. Testing".to_string(),
            password_hash: hash,
            role: 0,
            email_verified_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(repo.verify_password(&user, "correct horse battery").unwrap());
        assert!(!repo.verify_password(&user, "wrong password").unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }
}
