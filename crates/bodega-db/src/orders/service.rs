//! # Sale Order Service
//!
//! Create, update, issue and delete a sale, each as one transaction.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_sale / update_sale                                              │
//! │                                                                         │
//! │  validate request ─── error ──► nothing touched                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pool.begin() ──────────────────────────────────────┐                   │
//! │       │  load sale, check transition (update)       │                   │
//! │       │  warehouse + client exist                   │ any error:        │
//! │       │  folio + INSERT (create) / UPDATE (update)  │ tx dropped,       │
//! │       │  SaleLineSet::reconcile                     │ SQLite rolls back │
//! │       ▼                                             │                   │
//! │  tx.commit() ◄──────────────────────────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::line_set::SaleLineSet;
use crate::error::{DbError, DbResult};
use crate::repository::directory::{find_client, find_warehouse};
use crate::repository::sale::SaleStore;
use bodega_core::validation::{
    validate_folio, validate_id, validate_issue_document, validate_sale_request, validate_uuid,
};
use bodega_core::{
    ClientBilling, CoreError, IssueDocument, IssuedSale, Sale, SaleRequest, SaleStatus,
    SaleSummary, SaleTotals, Warehouse,
};

/// Engine behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineSettings {
    /// Reject requests whose declared totals disagree with their lines.
    pub strict_totals: bool,
}

/// Orchestrates every sale mutation.
#[derive(Debug, Clone)]
pub struct SaleOrderService {
    pool: SqlitePool,
    settings: EngineSettings,
}

impl SaleOrderService {
    pub fn new(pool: SqlitePool, settings: EngineSettings) -> Self {
        SaleOrderService { pool, settings }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Creates a sale in `request.status`, holding stock unless Pending.
    #[instrument(skip(self, request), fields(warehouse_id = %request.warehouse_id, status = %request.status))]
    pub async fn create_sale(&self, request: SaleRequest) -> DbResult<SaleSummary> {
        self.validate(&request)?;
        SaleStatus::validate_transition(None, request.status)?;

        let mut tx = self.pool.begin().await?;

        let warehouse = self.ensure_references(&mut tx, &request).await?;

        let mut store = SaleStore::new(&mut tx);
        let folio = store.next_folio().await?;
        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            folio,
            warehouse_id: request.warehouse_id,
            client_id: request.client_id,
            amount_total_products: request.totals.amount_total_products,
            price_subtotal_cents: request.totals.price_subtotal_cents,
            price_final_cents: request.totals.price_final_cents,
            status: request.status,
            type_emission: request.metadata.type_emission,
            observation: request.metadata.observation,
            name_companies: request.metadata.name_companies,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        store.insert(&sale).await?;

        let lines = SaleLineSet::new(&mut tx)
            .reconcile(&sale, None, &request.lines)
            .await?;

        commit(tx).await?;

        info!(sale_id = %sale.id, folio = sale.folio, lines = lines.len(), "Sale created");
        Ok(SaleSummary::new(sale, warehouse.name, lines))
    }

    /// Rewrites a sale: scalar fields, status and the full line set.
    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_sale(&self, sale_id: &str, request: SaleRequest) -> DbResult<Sale> {
        validate_uuid("sale_id", sale_id)?;
        self.validate(&request)?;

        let mut tx = self.pool.begin().await?;

        let current = SaleStore::new(&mut tx)
            .find(sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;

        SaleStatus::validate_transition(Some(current.status), request.status)?;
        self.ensure_references(&mut tx, &request).await?;

        let previous_status = current.status;
        let sale = Sale {
            warehouse_id: request.warehouse_id,
            client_id: request.client_id,
            amount_total_products: request.totals.amount_total_products,
            price_subtotal_cents: request.totals.price_subtotal_cents,
            price_final_cents: request.totals.price_final_cents,
            status: request.status,
            type_emission: request.metadata.type_emission,
            observation: request.metadata.observation,
            name_companies: request.metadata.name_companies,
            updated_at: Utc::now(),
            ..current
        };
        SaleStore::new(&mut tx).update(&sale).await?;

        let lines = SaleLineSet::new(&mut tx)
            .reconcile(&sale, Some(previous_status), &request.lines)
            .await?;

        commit(tx).await?;

        info!(
            sale_id = %sale.id,
            from = %previous_status,
            to = %sale.status,
            lines = lines.len(),
            "Sale updated"
        );
        Ok(sale)
    }

    /// Emits the sale document identified by a company and folio.
    ///
    /// Moves a Pending sale to Issued and takes the stock its existing lines
    /// describe. Lines are not rewritten. Invoices (`factura`) also return
    /// the client's billing fields.
    #[instrument(skip(self, document), fields(type_emission = %document.type_emission))]
    pub async fn issue_document(
        &self,
        company_id: &str,
        folio: i64,
        document: IssueDocument,
    ) -> DbResult<IssuedSale> {
        validate_id("company_id", company_id)?;
        validate_folio(folio)?;
        validate_issue_document(&document)?;

        let mut tx = self.pool.begin().await?;

        let current = SaleStore::new(&mut tx)
            .find_by_folio_for_company(company_id, folio)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", folio.to_string()))?;

        if current.status != SaleStatus::Pending {
            return Err(CoreError::AlreadyIssued {
                folio,
                status: current.status,
            }
            .into());
        }

        let client_billing = if document.is_invoice() {
            let client = find_client(&mut tx, &current.client_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Client", &current.client_id))?;
            Some(ClientBilling::from(client))
        } else {
            None
        };

        let sale = Sale {
            status: SaleStatus::Issued,
            type_emission: Some(document.type_emission.trim().to_string()),
            observation: document.observation.or(current.observation.clone()),
            name_companies: document.name_companies.or(current.name_companies.clone()),
            updated_at: Utc::now(),
            ..current
        };
        SaleStore::new(&mut tx).update(&sale).await?;

        SaleLineSet::new(&mut tx)
            .restate(&sale.id, SaleStatus::Pending, SaleStatus::Issued)
            .await?;

        commit(tx).await?;

        info!(sale_id = %sale.id, folio, invoice = client_billing.is_some(), "Sale document issued");
        Ok(IssuedSale {
            sale,
            client_billing,
        })
    }

    /// Soft-deletes a sale, returning any stock its lines hold.
    #[instrument(skip(self))]
    pub async fn delete_sale(&self, sale_id: &str) -> DbResult<()> {
        validate_uuid("sale_id", sale_id)?;

        let mut tx = self.pool.begin().await?;

        let sale = SaleStore::new(&mut tx)
            .find(sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;

        SaleLineSet::new(&mut tx).release(&sale.id, sale.status).await?;
        SaleStore::new(&mut tx).soft_delete(&sale.id, Utc::now()).await?;

        commit(tx).await?;

        info!(sale_id = %sale.id, folio = sale.folio, released = sale.status.applies_stock(), "Sale deleted");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn validate(&self, request: &SaleRequest) -> DbResult<()> {
        validate_sale_request(request, self.settings.strict_totals)?;

        if !self.settings.strict_totals {
            if let Err(mismatch) = SaleTotals::from_lines(&request.lines).verify(&request.totals) {
                warn!(%mismatch, "Client totals disagree with line items, keeping client values");
            }
        }

        Ok(())
    }

    async fn ensure_references(
        &self,
        conn: &mut sqlx::SqliteConnection,
        request: &SaleRequest,
    ) -> DbResult<Warehouse> {
        let warehouse = find_warehouse(conn, &request.warehouse_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Warehouse", &request.warehouse_id))?;

        find_client(conn, &request.client_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Client", &request.client_id))?;

        Ok(warehouse)
    }
}

async fn commit(tx: sqlx::Transaction<'_, sqlx::Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
