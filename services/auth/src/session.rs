//! Refresh-token session storage in Redis

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use common::cache::RedisPool;

/// Session manager for user sessions in Redis
///
/// One session per user: the currently valid refresh token, expiring with
/// the token itself.
#[derive(Clone)]
pub struct SessionManager {
    redis_pool: RedisPool,
    refresh_token_expiry: u64,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(redis_pool: RedisPool, refresh_token_expiry: u64) -> Self {
        Self {
            redis_pool,
            refresh_token_expiry,
        }
    }

    fn session_key(user_id: Uuid) -> String {
        format!("session:{}", user_id)
    }

    /// Store the session for a user
    pub async fn create_session(&self, user_id: Uuid, refresh_token: &str) -> Result<()> {
        info!("Creating session for user: {}", user_id);

        self.redis_pool
            .set(
                &Self::session_key(user_id),
                refresh_token,
                Some(self.refresh_token_expiry),
            )
            .await?;

        Ok(())
    }

    /// Get the stored refresh token for a user
    pub async fn get_session(&self, user_id: Uuid) -> Result<Option<String>> {
        let refresh_token = self.redis_pool.get(&Self::session_key(user_id)).await?;
        Ok(refresh_token)
    }

    /// Delete the session for a user
    pub async fn delete_session(&self, user_id: Uuid) -> Result<()> {
        info!("Deleting session for user: {}", user_id);

        self.redis_pool.delete(&Self::session_key(user_id)).await?;
        Ok(())
    }

    /// Check that a presented refresh token matches the stored session
    pub async fn is_session_valid(&self, user_id: Uuid, refresh_token: &str) -> Result<bool> {
        let stored_token = self.get_session(user_id).await?;

        match stored_token {
            Some(token) => Ok(token == refresh_token),
            None => Ok(false),
        }
    }
}
