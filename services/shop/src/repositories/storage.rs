//! Storage repository for database operations
//!
//! Primary designation is maintained here: the first storage created for a
//! cloth becomes primary, and promoting another storage demotes the
//! current one inside the same transaction.

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::{CreateStorageRequest, Storage, UpdateStorageRequest};

const STORAGE_COLUMNS: &str =
    "id, cloth_id, quantity_limit, is_primary, created_at, updated_at";

fn storage_from_row(row: &PgRow) -> Storage {
    Storage {
        id: row.get("id"),
        cloth_id: row.get("cloth_id"),
        quantity_limit: row.get("quantity_limit"),
        is_primary: row.get("is_primary"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Storage repository
#[derive(Clone)]
pub struct StorageRepository {
    pool: PgPool,
}

impl StorageRepository {
    /// Create a new storage repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new storage record
    ///
    /// Becomes primary when explicitly requested or when the cloth has no
    /// storage yet.
    pub async fn create(
        &self,
        payload: &CreateStorageRequest,
    ) -> Result<Storage, RepositoryError> {
        info!("Creating storage for cloth: {}", payload.cloth_id);

        let mut tx = self.pool.begin().await?;

        let cloth_exists: bool =
            sqlx::query("SELECT EXISTS(SELECT 1 FROM cloths WHERE id = $1) AS present")
                .bind(payload.cloth_id)
                .fetch_one(&mut *tx)
                .await?
                .get("present");

        if !cloth_exists {
            return Err(RepositoryError::InvalidReference("cloth id"));
        }

        let has_any: bool =
            sqlx::query("SELECT EXISTS(SELECT 1 FROM storages WHERE cloth_id = $1) AS present")
                .bind(payload.cloth_id)
                .fetch_one(&mut *tx)
                .await?
                .get("present");

        let make_primary = payload.is_primary.unwrap_or(false) || !has_any;

        if make_primary {
            sqlx::query(
                "UPDATE storages SET is_primary = false, updated_at = now()
                 WHERE cloth_id = $1 AND is_primary",
            )
            .bind(payload.cloth_id)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO storages (cloth_id, quantity_limit, is_primary)
            VALUES ($1, $2, $3)
            RETURNING {STORAGE_COLUMNS}
            "#,
        ))
        .bind(payload.cloth_id)
        .bind(payload.quantity_limit)
        .bind(make_primary)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(storage_from_row(&row))
    }

    /// Apply a partial update to a storage record
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateStorageRequest,
    ) -> Result<Storage, RepositoryError> {
        self.update_checked(id, None, payload).await
    }

    /// Update a storage record, requiring it to belong to `cloth_id`
    ///
    /// Backs the per-cloth stock edit endpoint.
    pub async fn update_for_cloth(
        &self,
        cloth_id: Uuid,
        id: Uuid,
        payload: &UpdateStorageRequest,
    ) -> Result<Storage, RepositoryError> {
        self.update_checked(id, Some(cloth_id), payload).await
    }

    async fn update_checked(
        &self,
        id: Uuid,
        cloth_id: Option<Uuid>,
        payload: &UpdateStorageRequest,
    ) -> Result<Storage, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {STORAGE_COLUMNS} FROM storages WHERE id = $1 FOR UPDATE",
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound("Storage"))?;

        let storage = storage_from_row(&row);

        if let Some(cloth_id) = cloth_id
            && storage.cloth_id != cloth_id
        {
            return Err(RepositoryError::NotFound("Storage"));
        }

        // Promoting this storage demotes the cloth's current primary.
        if payload.is_primary == Some(true) && !storage.is_primary {
            sqlx::query(
                "UPDATE storages SET is_primary = false, updated_at = now()
                 WHERE cloth_id = $1 AND is_primary",
            )
            .bind(storage.cloth_id)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE storages
            SET quantity_limit = COALESCE($2, quantity_limit),
                is_primary = COALESCE($3, is_primary),
                updated_at = now()
            WHERE id = $1
            RETURNING {STORAGE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(payload.quantity_limit)
        .bind(payload.is_primary)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(storage_from_row(&row))
    }

    /// Delete a storage record
    ///
    /// Returns false when it does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get all storage records in insertion order
    pub async fn get_all(&self) -> Result<Vec<Storage>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {STORAGE_COLUMNS} FROM storages ORDER BY created_at ASC",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(storage_from_row).collect())
    }

    /// Find a storage record by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Storage>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {STORAGE_COLUMNS} FROM storages WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(storage_from_row))
    }

    /// Find the primary storage for a cloth
    pub async fn find_primary_for_cloth(
        &self,
        cloth_id: Uuid,
    ) -> Result<Option<Storage>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {STORAGE_COLUMNS} FROM storages WHERE cloth_id = $1 AND is_primary",
        ))
        .bind(cloth_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(storage_from_row))
    }
}
