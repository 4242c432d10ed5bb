//! # bodega-db: Database Layer for Bodega
//!
//! SQLite persistence and the sale engine's units of work.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Bodega Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (PUT /api/sales/{id}/{status})                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bodega-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌───────────────┐   ┌──────────────┐    │   │
//! │  │   │    orders      │   │  repository   │   │   Database   │    │   │
//! │  │   │ SaleOrderSvc   │──►│ SaleStore     │   │  (pool.rs)   │    │   │
//! │  │   │ SaleLineSet    │──►│ StockLedger   │   │  SqlitePool  │    │   │
//! │  │   └────────────────┘   │ Directory     │   │  migrations  │    │   │
//! │  │                        └───────────────┘   └──────────────┘    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL, foreign keys on)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - SQL for sales, stock and the directory
//! - [`orders`] - Sale create / update / issue / delete transactions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bodega_db::{Database, DbConfig, EngineSettings};
//!
//! let db = Database::new(DbConfig::new("./data/bodega.db")).await?;
//! let summary = db
//!     .sale_orders(EngineSettings::default())
//!     .create_sale(request)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod orders;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use orders::{EngineSettings, SaleLineSet, SaleOrderService};
pub use pool::{Database, DbConfig};

pub use repository::directory::{DirectoryRepository, NewClient};
pub use repository::sale::{SaleRepository, SaleStore, DEFAULT_HISTORY_LIMIT};
pub use repository::stock::{NewStockItem, StockLedger, StockRepository};
