//! Cloth repository for database operations

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::{Cloth, ClothWithQuantity, CreateClothRequest, UpdateClothRequest};

const CLOTH_COLUMNS: &str = "id, name, category, price, description, created_at, updated_at";

fn cloth_from_row(row: &PgRow) -> Cloth {
    Cloth {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        price: row.get("price"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Cloth repository
#[derive(Clone)]
pub struct ClothRepository {
    pool: PgPool,
}

impl ClothRepository {
    /// Create a new cloth repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new cloth
    pub async fn create(&self, payload: &CreateClothRequest) -> Result<Cloth, RepositoryError> {
        info!("Creating cloth: {}", payload.name);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO cloths (name, category, price, description)
            VALUES ($1, $2, $3, $4)
            RETURNING {CLOTH_COLUMNS}
            "#,
        ))
        .bind(&payload.name)
        .bind(&payload.category)
        .bind(payload.price)
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(cloth_from_row(&row))
    }

    /// Apply a partial update to a cloth
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateClothRequest,
    ) -> Result<Cloth, RepositoryError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE cloths
            SET name = COALESCE($2, name),
                category = COALESCE($3, category),
                price = COALESCE($4, price),
                description = COALESCE($5, description),
                updated_at = now()
            WHERE id = $1
            RETURNING {CLOTH_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.category)
        .bind(payload.price)
        .bind(&payload.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Cloth"))?;

        Ok(cloth_from_row(&row))
    }

    /// Delete a cloth; its storages cascade
    ///
    /// Returns false when the cloth does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cloths WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get all cloths in insertion order
    pub async fn get_all(&self) -> Result<Vec<Cloth>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CLOTH_COLUMNS} FROM cloths ORDER BY created_at ASC",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(cloth_from_row).collect())
    }

    /// Find a cloth by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Cloth>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CLOTH_COLUMNS} FROM cloths WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(cloth_from_row))
    }

    /// Find a cloth together with its summed storage quantity
    pub async fn find_with_total_quantity(
        &self,
        id: Uuid,
    ) -> Result<Option<ClothWithQuantity>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT
                c.id, c.name, c.category, c.price, c.description,
                c.created_at, c.updated_at,
                COALESCE(SUM(s.quantity_limit), 0)::bigint AS total_quantity
            FROM cloths c
            LEFT JOIN storages s ON s.cloth_id = c.id
            WHERE c.id = $1
            GROUP BY c.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ClothWithQuantity {
            cloth: cloth_from_row(&row),
            total_quantity: row.get("total_quantity"),
        }))
    }
}
