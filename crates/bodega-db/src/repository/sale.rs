//! # Sale Repository
//!
//! Database operations for sales and their line items.
//!
//! ## Two Access Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SaleOrderService (writes)             SaleRepository (reads)          │
//! │       │ pool.begin()                        │ pool                      │
//! │       ▼                                     ▼                           │
//! │  SaleStore<'tx>  ───────────────►  same SQL, borrowed connection       │
//! │  insert / update / lines / folio                                       │
//! │                                                                         │
//! │  Soft-deleted sales (deleted_at set) are invisible to both.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use bodega_core::{Sale, SaleHistoryRow, SaleLine, SaleWithLines};

const SALE_COLUMNS: &str = r#"
    id, folio, warehouse_id, client_id,
    amount_total_products, price_subtotal_cents, price_final_cents,
    status, type_emission, observation, name_companies,
    created_at, updated_at, deleted_at
"#;

const LINE_COLUMNS: &str = r#"
    id, sale_id, stock_item_id, position,
    quantity, unit_price_cents, line_total_cents, created_at
"#;

/// Default page size for company history.
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

// =============================================================================
// Store (borrowed connection)
// =============================================================================

/// Sale queries bound to one connection, usually an open transaction.
pub struct SaleStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SaleStore<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        SaleStore { conn }
    }

    /// Gets a live (not soft-deleted) sale by ID.
    pub async fn find(&mut self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1 AND deleted_at IS NULL");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(sale)
    }

    /// Gets a live sale by folio, only if its warehouse belongs to `company_id`.
    pub async fn find_by_folio_for_company(
        &mut self,
        company_id: &str,
        folio: i64,
    ) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                s.id, s.folio, s.warehouse_id, s.client_id,
                s.amount_total_products, s.price_subtotal_cents, s.price_final_cents,
                s.status, s.type_emission, s.observation, s.name_companies,
                s.created_at, s.updated_at, s.deleted_at
            FROM sales s
            JOIN warehouses w ON w.id = s.warehouse_id
            WHERE s.folio = ?1 AND w.company_id = ?2 AND s.deleted_at IS NULL
            "#,
        )
        .bind(folio)
        .bind(company_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(sale)
    }

    /// Next folio number. Deleted sales keep theirs.
    pub async fn next_folio(&mut self) -> DbResult<i64> {
        let folio: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(folio), 0) + 1 FROM sales")
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(folio)
    }

    pub async fn insert(&mut self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, folio = sale.folio, status = %sale.status, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, folio, warehouse_id, client_id,
                amount_total_products, price_subtotal_cents, price_final_cents,
                status, type_emission, observation, name_companies,
                created_at, updated_at, deleted_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12, ?13, ?14
            )
            "#,
        )
        .bind(&sale.id)
        .bind(sale.folio)
        .bind(&sale.warehouse_id)
        .bind(&sale.client_id)
        .bind(sale.amount_total_products)
        .bind(sale.price_subtotal_cents)
        .bind(sale.price_final_cents)
        .bind(sale.status)
        .bind(&sale.type_emission)
        .bind(&sale.observation)
        .bind(&sale.name_companies)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .bind(sale.deleted_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Writes every mutable scalar field of a live sale.
    pub async fn update(&mut self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, status = %sale.status, "Updating sale");

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                warehouse_id = ?2,
                client_id = ?3,
                amount_total_products = ?4,
                price_subtotal_cents = ?5,
                price_final_cents = ?6,
                status = ?7,
                type_emission = ?8,
                observation = ?9,
                name_companies = ?10,
                updated_at = ?11
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.warehouse_id)
        .bind(&sale.client_id)
        .bind(sale.amount_total_products)
        .bind(sale.price_subtotal_cents)
        .bind(sale.price_final_cents)
        .bind(sale.status)
        .bind(&sale.type_emission)
        .bind(&sale.observation)
        .bind(&sale.name_companies)
        .bind(sale.updated_at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", &sale.id));
        }

        Ok(())
    }

    /// Marks a sale deleted. Its lines stay for auditing.
    pub async fn soft_delete(&mut self, id: &str, at: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE sales SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Lines of a sale in request order.
    pub async fn lines(&mut self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let sql = format!("SELECT {LINE_COLUMNS} FROM sale_lines WHERE sale_id = ?1 ORDER BY position");
        let lines = sqlx::query_as::<_, SaleLine>(&sql)
            .bind(sale_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(lines)
    }

    /// Removes every line of a sale; returns how many were removed.
    pub async fn delete_lines(&mut self, sale_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sale_lines WHERE sale_id = ?1")
            .bind(sale_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_line(&mut self, line: &SaleLine) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                id, sale_id, stock_item_id, position,
                quantity, unit_price_cents, line_total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&line.id)
        .bind(&line.sale_id)
        .bind(&line.stock_item_id)
        .bind(line.position)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.line_total_cents)
        .bind(line.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Repository (pooled reads)
// =============================================================================

/// Read-only sale lookups.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a live sale with its lines.
    pub async fn get_with_lines(&self, id: &str) -> DbResult<Option<SaleWithLines>> {
        let mut conn = self.pool.acquire().await?;
        let mut store = SaleStore::new(&mut conn);

        let Some(sale) = store.find(id).await? else {
            return Ok(None);
        };
        let lines = store.lines(&sale.id).await?;

        Ok(Some(SaleWithLines { sale, lines }))
    }

    /// A company's sales across its warehouses, newest first.
    pub async fn company_history(
        &self,
        company_id: &str,
        limit: i64,
    ) -> DbResult<Vec<SaleHistoryRow>> {
        let rows = sqlx::query_as::<_, SaleHistoryRow>(
            r#"
            SELECT
                s.id, s.folio, s.status,
                s.warehouse_id, w.name AS warehouse_name,
                s.client_id, c.name AS client_name,
                s.amount_total_products, s.price_final_cents,
                s.type_emission, s.created_at
            FROM sales s
            JOIN warehouses w ON w.id = s.warehouse_id
            JOIN clients c ON c.id = s.client_id
            WHERE w.company_id = ?1 AND s.deleted_at IS NULL
            ORDER BY s.folio DESC
            LIMIT ?2
            "#,
        )
        .bind(company_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
