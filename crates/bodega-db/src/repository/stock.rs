//! # Stock Ledger
//!
//! Per-warehouse item quantities.
//!
//! ## Check-and-Reserve
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two writers, one row with available_quantity = 5                      │
//! │                                                                         │
//! │  Writer A: decrement 4                Writer B: decrement 3            │
//! │     UPDATE ... SET q = q - 4             UPDATE ... SET q = q - 3      │
//! │     WHERE id = S AND q >= 4              WHERE id = S AND q >= 3       │
//! │       │ 1 row → q = 1                      │ 0 rows (q is 1)           │
//! │       ▼                                    ▼                            │
//! │     commit                             InsufficientStock, rollback     │
//! │                                                                         │
//! │  The guard lives in the UPDATE itself, so no read-then-write window.   │
//! │  CHECK (available_quantity >= 0) backs it in the schema.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`StockLedger`] borrows the caller's transaction connection; every call is
//! part of the caller's unit of work. [`StockRepository`] serves pooled
//! reads and inserts outside of one.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use bodega_core::lines::{self, StockDelta};
use bodega_core::{CoreError, StockItem};

const STOCK_COLUMNS: &str =
    "id, warehouse_id, sku, title, price_cents, available_quantity, created_at, updated_at";

// =============================================================================
// Ledger (transactional)
// =============================================================================

/// Stock operations bound to an open transaction.
pub struct StockLedger<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> StockLedger<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        StockLedger { conn }
    }

    /// Loads a stock item only if it belongs to `warehouse_id`.
    pub async fn find_in_warehouse(
        &mut self,
        stock_item_id: &str,
        warehouse_id: &str,
    ) -> DbResult<Option<StockItem>> {
        let sql = format!(
            "SELECT {STOCK_COLUMNS} FROM stock_items WHERE id = ?1 AND warehouse_id = ?2"
        );
        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(stock_item_id)
            .bind(warehouse_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(item)
    }

    /// Verifies that `requested` units of an item can be held.
    ///
    /// `held` is what the sale being written already holds on this item;
    /// it counts as available because reconciliation returns it first.
    ///
    /// ## Errors
    /// - `NotFound` if the item does not exist in `warehouse_id`
    /// - `InsufficientStock` with the row's current quantity
    pub async fn check_availability(
        &mut self,
        stock_item_id: &str,
        warehouse_id: &str,
        requested: i64,
        held: i64,
    ) -> DbResult<StockItem> {
        let item = self
            .find_in_warehouse(stock_item_id, warehouse_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Stock item", stock_item_id))?;

        lines::check_availability(stock_item_id, item.available_quantity, held, requested)?;

        Ok(item)
    }

    /// Takes `qty` units, failing instead of going negative.
    pub async fn decrement(&mut self, stock_item_id: &str, qty: i64) -> DbResult<()> {
        debug!(stock_item_id = %stock_item_id, qty, "Decrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE stock_items SET
                available_quantity = available_quantity - ?1,
                updated_at = ?2
            WHERE id = ?3 AND available_quantity >= ?1
            "#,
        )
        .bind(qty)
        .bind(Utc::now())
        .bind(stock_item_id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT available_quantity FROM stock_items WHERE id = ?1")
                    .bind(stock_item_id)
                    .fetch_optional(&mut *self.conn)
                    .await?;

            return Err(match available {
                Some(available) => CoreError::InsufficientStock {
                    stock_item_id: stock_item_id.to_string(),
                    available,
                    requested: qty,
                },
                None => CoreError::not_found("Stock item", stock_item_id),
            }
            .into());
        }

        Ok(())
    }

    /// Returns `qty` units to the item.
    pub async fn increment(&mut self, stock_item_id: &str, qty: i64) -> DbResult<()> {
        debug!(stock_item_id = %stock_item_id, qty, "Incrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE stock_items SET
                available_quantity = available_quantity + ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(qty)
        .bind(Utc::now())
        .bind(stock_item_id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Stock item", stock_item_id).into());
        }

        Ok(())
    }

    /// Applies a batch of movements in order.
    pub async fn apply(&mut self, deltas: &[StockDelta]) -> DbResult<()> {
        for delta in deltas {
            if delta.is_decrement() {
                self.decrement(&delta.stock_item_id, delta.delta).await?;
            } else {
                self.increment(&delta.stock_item_id, -delta.delta).await?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Repository (pooled)
// =============================================================================

/// Fields for a new stock item.
#[derive(Debug, Clone)]
pub struct NewStockItem {
    pub warehouse_id: String,
    pub sku: String,
    pub title: String,
    pub price_cents: i64,
    pub available_quantity: i64,
}

/// Repository for stock item reads and inserts.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Gets a stock item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockItem>> {
        let sql = format!("SELECT {STOCK_COLUMNS} FROM stock_items WHERE id = ?1");
        let item = sqlx::query_as::<_, StockItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists a warehouse's stock items ordered by SKU.
    pub async fn list_by_warehouse(&self, warehouse_id: &str) -> DbResult<Vec<StockItem>> {
        let sql =
            format!("SELECT {STOCK_COLUMNS} FROM stock_items WHERE warehouse_id = ?1 ORDER BY sku");
        let items = sqlx::query_as::<_, StockItem>(&sql)
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Inserts a stock item.
    pub async fn create(&self, new: NewStockItem) -> DbResult<StockItem> {
        let now = Utc::now();
        let item = StockItem {
            id: Uuid::new_v4().to_string(),
            warehouse_id: new.warehouse_id,
            sku: new.sku,
            title: new.title,
            price_cents: new.price_cents,
            available_quantity: new.available_quantity,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, sku = %item.sku, "Inserting stock item");

        sqlx::query(
            r#"
            INSERT INTO stock_items (
                id, warehouse_id, sku, title,
                price_cents, available_quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.warehouse_id)
        .bind(&item.sku)
        .bind(&item.title)
        .bind(item.price_cents)
        .bind(item.available_quantity)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
