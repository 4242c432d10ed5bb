//! # bodega-core: Pure Business Logic for Bodega
//!
//! This crate holds the rules of the sale engine as pure functions with zero
//! I/O dependencies. The database crate sequences these rules inside a
//! transaction; nothing here knows a database exists.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Bodega Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (bodega-api)                        │   │
//! │  │    POST /sales/{status}   PUT /sales/{id}/{status}   ...        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               bodega-db (SaleOrderService, StockLedger)          │   │
//! │  │              SQLite queries, migrations, unit of work            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ calls pure rules                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bodega-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ lifecycle │  │   lines   │  │ validation│  │   │
//! │  │   │   Sale    │  │SaleStatus │  │ aggregate │  │   rules   │  │   │
//! │  │   │ StockItem │  │transitions│  │  deltas   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sale, SaleLine, StockItem, Warehouse, Client)
//! - [`lifecycle`] - Sale status state machine
//! - [`lines`] - Line aggregation, stock holds and deltas, totals
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation
//!
//! ## Example Usage
//!
//! ```rust
//! use bodega_core::SaleStatus;
//!
//! let status: SaleStatus = "emitido".parse().unwrap();
//! assert!(status.applies_stock());
//! assert!(SaleStatus::Pending.can_transition_to(status));
//! assert!(!status.can_transition_to(SaleStatus::Pending));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod lines;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::SaleStatus;
pub use lines::{LineRequest, SaleTotals, StockDelta};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of line items accepted in a single sale request.
pub const MAX_SALE_LINES: usize = 200;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches typos (an extra zero or two) before they reach stock checks.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Maximum amount in cents for a price, line total or sale total.
///
/// With at most [`MAX_SALE_LINES`] lines, summing line totals stays far
/// below `i64::MAX`.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000_000;

/// Maximum length of free-text sale fields (observation, company name).
pub const MAX_TEXT_LENGTH: usize = 1000;
