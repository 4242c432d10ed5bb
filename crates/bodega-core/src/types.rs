//! # Domain Types
//!
//! Core domain types used throughout Bodega.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Company      │◄──│   Warehouse     │◄──│   StockItem     │       │
//! │  │  id, name       │   │  id, company_id │   │  available_qty  │       │
//! │  └─────────────────┘   └────────▲────────┘   └────────▲────────┘       │
//! │                                 │                     │                 │
//! │  ┌─────────────────┐   ┌────────┴────────┐   ┌────────┴────────┐       │
//! │  │     Client      │◄──│      Sale       │◄──│    SaleLine     │       │
//! │  │  billing fields │   │  id + folio     │   │  quantity       │       │
//! │  └─────────────────┘   │  status, totals │   │  unit/line total│       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Sales have:
//! - `id`: UUID v4 - immutable, used for relations and the update endpoint
//! - `folio`: sequential number printed on documents, used to issue them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::lifecycle::SaleStatus;
use crate::lines::LineRequest;
use crate::money::Money;

/// Emission type that asks for the client's billing data.
pub const INVOICE_EMISSION: &str = "factura";

// =============================================================================
// Organization
// =============================================================================

/// A company owning one or more warehouses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A physical stock location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Warehouse {
    pub id: String,
    pub company_id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Client
// =============================================================================

/// The buyer of a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub name: String,
    /// Tax identification number (RUT).
    pub tax_id: Option<String>,
    /// Registered business name (razón social).
    pub business_name: Option<String>,
    /// Declared business activity (giro).
    pub business_activity: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Billing fields returned when an invoice is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientBilling {
    pub client_id: String,
    pub name: String,
    pub tax_id: Option<String>,
    pub business_name: Option<String>,
    pub business_activity: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

impl From<Client> for ClientBilling {
    fn from(client: Client) -> Self {
        ClientBilling {
            client_id: client.id,
            name: client.name,
            tax_id: client.tax_id,
            business_name: client.business_name,
            business_activity: client.business_activity,
            address: client.address,
            email: client.email,
        }
    }
}

// =============================================================================
// Stock Item
// =============================================================================

/// A warehouse-scoped inventory record.
///
/// `available_quantity` never goes negative after a committed write; the
/// ledger decrements it with a conditional update and the schema backs that
/// with a CHECK constraint.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockItem {
    pub id: String,
    pub warehouse_id: String,
    pub sku: String,
    pub title: String,
    pub price_cents: i64,
    pub available_quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// The sale aggregate root.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub folio: i64,
    pub warehouse_id: String,
    pub client_id: String,
    /// Units across all lines, as declared by the client.
    pub amount_total_products: i64,
    pub price_subtotal_cents: i64,
    pub price_final_cents: i64,
    pub status: SaleStatus,
    pub type_emission: Option<String>,
    pub observation: Option<String>,
    pub name_companies: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Sale {
    #[inline]
    pub fn price_subtotal(&self) -> Money {
        Money::from_cents(self.price_subtotal_cents)
    }

    #[inline]
    pub fn price_final(&self) -> Money {
        Money::from_cents(self.price_final_cents)
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A line item of a sale. Replaced wholesale on every sale write.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub stock_item_id: String,
    /// Zero-based position in the request that created the line.
    pub position: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// A sale together with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithLines {
    #[serde(flatten)]
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

/// What a successful create returns to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleSummary {
    pub id: String,
    pub folio: i64,
    pub warehouse_id: String,
    pub warehouse_name: String,
    pub client_id: String,
    pub status: SaleStatus,
    pub amount_total_products: i64,
    pub price_subtotal_cents: i64,
    pub price_final_cents: i64,
    pub type_emission: Option<String>,
    pub observation: Option<String>,
    pub name_companies: Option<String>,
    /// RFC 3339.
    pub created_at: String,
    /// RFC 3339.
    pub updated_at: String,
    pub lines: Vec<SaleLine>,
}

impl SaleSummary {
    pub fn new(sale: Sale, warehouse_name: impl Into<String>, lines: Vec<SaleLine>) -> Self {
        SaleSummary {
            created_at: sale.created_at.to_rfc3339(),
            updated_at: sale.updated_at.to_rfc3339(),
            id: sale.id,
            folio: sale.folio,
            warehouse_id: sale.warehouse_id,
            warehouse_name: warehouse_name.into(),
            client_id: sale.client_id,
            status: sale.status,
            amount_total_products: sale.amount_total_products,
            price_subtotal_cents: sale.price_subtotal_cents,
            price_final_cents: sale.price_final_cents,
            type_emission: sale.type_emission,
            observation: sale.observation,
            name_companies: sale.name_companies,
            lines,
        }
    }
}

/// Result of emitting a sale document.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IssuedSale {
    pub sale: Sale,
    /// Present only for invoice (`factura`) emissions.
    pub client_billing: Option<ClientBilling>,
}

/// One row of a company's sale history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleHistoryRow {
    pub id: String,
    pub folio: i64,
    pub status: SaleStatus,
    pub warehouse_id: String,
    pub warehouse_name: String,
    pub client_id: String,
    pub client_name: String,
    pub amount_total_products: i64,
    pub price_final_cents: i64,
    pub type_emission: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Requests
// =============================================================================

/// Totals as declared by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientTotals {
    pub amount_total_products: i64,
    pub price_subtotal_cents: i64,
    pub price_final_cents: i64,
}

/// Optional document fields of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleMetadata {
    pub type_emission: Option<String>,
    pub observation: Option<String>,
    pub name_companies: Option<String>,
}

/// Everything needed to create or rewrite a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    pub warehouse_id: String,
    pub client_id: String,
    pub lines: Vec<LineRequest>,
    pub totals: ClientTotals,
    pub status: SaleStatus,
    pub metadata: SaleMetadata,
}

/// Fields recorded when a sale's document is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IssueDocument {
    pub type_emission: String,
    pub observation: Option<String>,
    pub name_companies: Option<String>,
}

impl IssueDocument {
    /// Whether this emission is an invoice (case-insensitive `factura`).
    pub fn is_invoice(&self) -> bool {
        self.type_emission.trim().eq_ignore_ascii_case(INVOICE_EMISSION)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sale() -> Sale {
        let now = Utc::now();
        Sale {
            id: "sale-1".to_string(),
            folio: 7,
            warehouse_id: "w-1".to_string(),
            client_id: "c-1".to_string(),
            amount_total_products: 4,
            price_subtotal_cents: 4000,
            price_final_cents: 4000,
            status: SaleStatus::Pending,
            type_emission: None,
            observation: Some("entregar en bodega".to_string()),
            name_companies: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_invoice_detection() {
        let doc = IssueDocument {
            type_emission: " Factura ".to_string(),
            observation: None,
            name_companies: None,
        };
        assert!(doc.is_invoice());

        let doc = IssueDocument {
            type_emission: "boleta".to_string(),
            ..doc
        };
        assert!(!doc.is_invoice());
    }

    #[test]
    fn test_summary_formats_timestamps() {
        let sale = sale();
        let created = sale.created_at;
        let summary = SaleSummary::new(sale, "Bodega Central", Vec::new());

        assert_eq!(summary.folio, 7);
        assert_eq!(summary.warehouse_name, "Bodega Central");
        assert_eq!(summary.created_at, created.to_rfc3339());
        assert!(DateTime::parse_from_rfc3339(&summary.updated_at).is_ok());
    }

    #[test]
    fn test_billing_from_client() {
        let client = Client {
            id: "c-1".to_string(),
            name: "Ferretería Sur".to_string(),
            tax_id: Some("76.123.456-7".to_string()),
            business_name: Some("Ferretería Sur SpA".to_string()),
            business_activity: Some("Comercio".to_string()),
            address: None,
            email: None,
            created_at: Utc::now(),
        };
        let billing = ClientBilling::from(client);
        assert_eq!(billing.client_id, "c-1");
        assert_eq!(billing.tax_id.as_deref(), Some("76.123.456-7"));
    }

    #[test]
    fn test_sale_money_accessors() {
        let sale = sale();
        assert_eq!(sale.price_final(), Money::from_cents(4000));
        assert!(!sale.is_deleted());
    }
}
