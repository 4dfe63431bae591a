//! Buy repository: purchase creation, reconciliation, and queries
//!
//! Purchase creation is the one place the backend mutates two rows at
//! once: the buy insert and the storage decrement commit together or not
//! at all. The decrement is a conditional update re-checking the remaining
//! quantity, so two requests racing for the same units cannot both win:
//! the losing transaction sees zero affected rows and aborts.

use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::buy::{Buy, BuyFilter, PER_PAGE, UpdateBuyRequest, page_offset};
use crate::stock::{self, StockDecision};

const BUY_COLUMNS: &str = "id, user_id, cloth_id, quantity, payment_method, payment_status, \
                           confirmation_status, created_at, updated_at";

fn buy_from_row(row: &PgRow) -> Buy {
    Buy {
        id: row.get("id"),
        user_id: row.get("user_id"),
        cloth_id: row.get("cloth_id"),
        quantity: row.get("quantity"),
        payment_method: row.get("payment_method"),
        payment_status: row.get("payment_status"),
        confirmation_status: row.get("confirmation_status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// A validated purchase ready for insertion
///
/// Statuses are absent on purpose: the server always records a fresh
/// purchase as unpaid and unconfirmed.
#[derive(Debug, Clone)]
pub struct NewBuy {
    pub user_id: Uuid,
    pub cloth_id: Uuid,
    pub quantity: i32,
    pub payment_method: String,
}

/// Buy repository
#[derive(Clone)]
pub struct BuyRepository {
    pool: PgPool,
}

impl BuyRepository {
    /// Create a new buy repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether a user exists
    pub async fn user_exists(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1) AS present")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("present"))
    }

    /// Create a purchase and decrement the primary storage atomically
    pub async fn create(&self, input: &NewBuy) -> Result<Buy, RepositoryError> {
        info!(
            "Creating buy: user={} cloth={} quantity={}",
            input.user_id, input.cloth_id, input.quantity
        );

        let mut tx = self.pool.begin().await?;

        let cloth_exists: bool =
            sqlx::query("SELECT EXISTS(SELECT 1 FROM cloths WHERE id = $1) AS present")
                .bind(input.cloth_id)
                .fetch_one(&mut *tx)
                .await?
                .get("present");

        if !cloth_exists {
            return Err(RepositoryError::InvalidReference("cloth id"));
        }

        // The row lock serializes purchases of the same cloth for the rest
        // of the transaction.
        let storage = sqlx::query(
            "SELECT id, quantity_limit FROM storages
             WHERE cloth_id = $1 AND is_primary
             FOR UPDATE",
        )
        .bind(input.cloth_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::StorageNotFound)?;

        let storage_id: Uuid = storage.get("id");
        let quantity_limit: i32 = storage.get("quantity_limit");

        if stock::decide(quantity_limit, input.quantity) == StockDecision::Rejected {
            return Err(RepositoryError::InsufficientStock);
        }

        take_stock(&mut tx, storage_id, input.quantity).await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO buys (user_id, cloth_id, quantity, payment_method)
            VALUES ($1, $2, $3, $4)
            RETURNING {BUY_COLUMNS}
            "#,
        ))
        .bind(input.user_id)
        .bind(input.cloth_id)
        .bind(input.quantity)
        .bind(&input.payment_method)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(buy_from_row(&row))
    }

    /// Apply a partial update to a purchase
    ///
    /// A quantity change reconciles the cloth's primary storage in the
    /// same transaction: an increase takes the difference from stock (and
    /// fails like a purchase when it does not fit), a decrease returns it.
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateBuyRequest,
    ) -> Result<Buy, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {BUY_COLUMNS} FROM buys WHERE id = $1 FOR UPDATE",
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound("Buy"))?;

        let buy = buy_from_row(&row);

        if let Some(new_quantity) = payload.quantity {
            let delta = new_quantity - buy.quantity;

            if delta != 0 {
                let storage = sqlx::query(
                    "SELECT id, quantity_limit FROM storages
                     WHERE cloth_id = $1 AND is_primary
                     FOR UPDATE",
                )
                .bind(buy.cloth_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::StorageNotFound)?;

                let storage_id: Uuid = storage.get("id");
                let quantity_limit: i32 = storage.get("quantity_limit");

                if delta > 0 {
                    if stock::decide(quantity_limit, delta) == StockDecision::Rejected {
                        return Err(RepositoryError::InsufficientStock);
                    }
                    take_stock(&mut tx, storage_id, delta).await?;
                } else {
                    return_stock(&mut tx, storage_id, -delta).await?;
                }
            }
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE buys
            SET quantity = COALESCE($2, quantity),
                payment_method = COALESCE($3, payment_method),
                payment_status = COALESCE($4, payment_status),
                confirmation_status = COALESCE($5, confirmation_status),
                updated_at = now()
            WHERE id = $1
            RETURNING {BUY_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(payload.quantity)
        .bind(&payload.payment_method)
        .bind(payload.payment_status)
        .bind(payload.confirmation_status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(buy_from_row(&row))
    }

    /// Mark a purchase as paid
    ///
    /// Idempotent: confirming an already-paid purchase is a no-op success.
    /// Returns false when the purchase does not exist.
    pub async fn confirm_payment(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE buys SET payment_status = 1, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a purchase, returning its quantity to the primary storage
    ///
    /// Returns false when the purchase does not exist. When the cloth no
    /// longer has a primary storage there is nothing to return the units
    /// to; the deletion still proceeds.
    pub async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {BUY_COLUMNS} FROM buys WHERE id = $1 FOR UPDATE",
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(false);
        };
        let buy = buy_from_row(&row);

        sqlx::query(
            "UPDATE storages
             SET quantity_limit = quantity_limit + $2, updated_at = now()
             WHERE cloth_id = $1 AND is_primary",
        )
        .bind(buy.cloth_id)
        .bind(buy.quantity)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM buys WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }

    /// Find a purchase by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Buy>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {BUY_COLUMNS} FROM buys WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(buy_from_row))
    }

    /// List purchases in insertion order, one page at a time
    ///
    /// Optionally scoped to one user and narrowed by the attribute filter.
    /// Returns the page of rows plus the total matching row count for
    /// pagination metadata.
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
        filter: &BuyFilter,
        page: u32,
    ) -> Result<(Vec<Buy>, i64), RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {BUY_COLUMNS} FROM buys
             WHERE ($1::uuid IS NULL OR user_id = $1)
               AND ($2::text IS NULL OR payment_method = $2)
               AND ($3::smallint IS NULL OR payment_status = $3)
               AND ($4::smallint IS NULL OR confirmation_status = $4)
             ORDER BY created_at ASC
             LIMIT $5 OFFSET $6",
        ))
        .bind(user_id)
        .bind(&filter.payment_method)
        .bind(filter.payment_status)
        .bind(filter.confirmation_status)
        .bind(i64::from(PER_PAGE))
        .bind(page_offset(page))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS total FROM buys
             WHERE ($1::uuid IS NULL OR user_id = $1)
               AND ($2::text IS NULL OR payment_method = $2)
               AND ($3::smallint IS NULL OR payment_status = $3)
               AND ($4::smallint IS NULL OR confirmation_status = $4)",
        )
        .bind(user_id)
        .bind(&filter.payment_method)
        .bind(filter.payment_status)
        .bind(filter.confirmation_status)
        .fetch_one(&self.pool)
        .await?
        .get("total");

        Ok((rows.iter().map(buy_from_row).collect(), total))
    }
}

/// Take `quantity` units from a storage, re-checking the limit in SQL
///
/// Zero affected rows means the pre-checked quantity was taken by a
/// concurrent transaction; the caller's transaction aborts on the error.
async fn take_stock(
    tx: &mut Transaction<'_, Postgres>,
    storage_id: Uuid,
    quantity: i32,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE storages
         SET quantity_limit = quantity_limit - $2, updated_at = now()
         WHERE id = $1 AND quantity_limit >= $2",
    )
    .bind(storage_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::InsufficientStock);
    }

    Ok(())
}

/// Return `quantity` units to a storage
async fn return_stock(
    tx: &mut Transaction<'_, Postgres>,
    storage_id: Uuid,
    quantity: i32,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE storages
         SET quantity_limit = quantity_limit + $2, updated_at = now()
         WHERE id = $1",
    )
    .bind(storage_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
