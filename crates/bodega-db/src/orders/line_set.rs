//! # Sale Line Set
//!
//! Keeps a sale's lines and the stock they hold in step.
//!
//! ## Reconcile
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reconcile(sale, previous_status, requested)                           │
//! │                                                                         │
//! │  1. old lines  → held (only if previous status applied stock)          │
//! │     DELETE all old lines                                               │
//! │  2. aggregate requested per item → check_availability(item, held)      │
//! │     NotFound / InsufficientStock → caller's transaction rolls back     │
//! │  3. INSERT one line per requested entry, position = request order     │
//! │  4. target (only if new status applies stock)                          │
//! │     apply stock_deltas(held, target)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::sale::SaleStore;
use crate::repository::stock::StockLedger;
use bodega_core::lines::{
    aggregate_requests, held_quantities, quantity_of, stock_deltas, target_quantities,
    ItemQuantity,
};
use bodega_core::{LineRequest, Sale, SaleLine, SaleStatus};

/// The lines of one sale, operated on inside the caller's transaction.
pub struct SaleLineSet<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SaleLineSet<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        SaleLineSet { conn }
    }

    /// Replaces every line of `sale` with `requested` and moves stock by the
    /// difference between what the sale held and what it must now hold.
    ///
    /// `previous_status` is `None` for a sale created in this transaction.
    /// `sale.status` is the status being written.
    pub async fn reconcile(
        &mut self,
        sale: &Sale,
        previous_status: Option<SaleStatus>,
        requested: &[LineRequest],
    ) -> DbResult<Vec<SaleLine>> {
        let mut store = SaleStore::new(&mut *self.conn);
        let old_lines = store.lines(&sale.id).await?;
        let held = match previous_status {
            Some(status) => held_quantities(status, &old_lines),
            None => Vec::new(),
        };
        let removed = store.delete_lines(&sale.id).await?;

        let mut ledger = StockLedger::new(&mut *self.conn);
        for item in aggregate_requests(requested) {
            ledger
                .check_availability(
                    &item.stock_item_id,
                    &sale.warehouse_id,
                    item.quantity,
                    quantity_of(&held, &item.stock_item_id),
                )
                .await?;
        }

        let now = Utc::now();
        let mut store = SaleStore::new(&mut *self.conn);
        let mut lines = Vec::with_capacity(requested.len());
        for (position, request) in requested.iter().enumerate() {
            let line = SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                stock_item_id: request.stock_item_id.clone(),
                position: position as i64,
                quantity: request.quantity,
                unit_price_cents: request.unit_price_cents,
                line_total_cents: request.line_total_cents,
                created_at: now,
            };
            store.insert_line(&line).await?;
            lines.push(line);
        }

        debug!(
            sale_id = %sale.id,
            removed,
            inserted = lines.len(),
            "Sale lines replaced"
        );

        let target = target_quantities(sale.status, requested);
        self.move_stock(&held, &target).await?;

        Ok(lines)
    }

    /// Moves stock for a status change that leaves the lines untouched.
    pub async fn restate(
        &mut self,
        sale_id: &str,
        from: SaleStatus,
        to: SaleStatus,
    ) -> DbResult<Vec<SaleLine>> {
        let lines = SaleStore::new(&mut *self.conn).lines(sale_id).await?;
        let held = held_quantities(from, &lines);
        let target = held_quantities(to, &lines);
        self.move_stock(&held, &target).await?;
        Ok(lines)
    }

    /// Returns whatever stock the sale's lines hold under `status`.
    pub async fn release(&mut self, sale_id: &str, status: SaleStatus) -> DbResult<()> {
        let lines = SaleStore::new(&mut *self.conn).lines(sale_id).await?;
        let held = held_quantities(status, &lines);
        self.move_stock(&held, &[]).await
    }

    async fn move_stock(&mut self, held: &[ItemQuantity], target: &[ItemQuantity]) -> DbResult<()> {
        let deltas = stock_deltas(held, target);
        if !deltas.is_empty() {
            debug!(movements = deltas.len(), "Applying stock movements");
        }
        StockLedger::new(&mut *self.conn).apply(&deltas).await
    }
}
