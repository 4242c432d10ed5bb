//! # Bodega API
//!
//! HTTP/JSON surface over the sale engine.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Bodega API                                     │
//! │                                                                         │
//! │  POST   /api/sales/{status}                       create a sale         │
//! │  PUT    /api/sales/{sale_id}/{status}             rewrite a sale        │
//! │  GET    /api/sales/{sale_id}                      sale with lines       │
//! │  DELETE /api/sales/{sale_id}                      soft delete           │
//! │  PUT    /api/companies/{id}/sales/{folio}/document  emit document       │
//! │  GET    /api/companies/{id}/sales?limit=N         company history       │
//! │  GET    /health                                   database health       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `BODEGA_HTTP_PORT` - HTTP listen port (default: 8080)
//! - `BODEGA_DB_PATH` - SQLite file (default: ./data/bodega.db)
//! - `BODEGA_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `BODEGA_STRICT_TOTALS` - Reject mismatching client totals (default: false)

pub mod config;
pub mod error;
pub mod routes;

use axum::routing::{get, put};
use axum::Router;

use bodega_db::{Database, EngineSettings, SaleOrderService};

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub orders: SaleOrderService,
}

impl AppState {
    pub fn new(db: Database, settings: EngineSettings) -> Self {
        let orders = db.sale_orders(settings);
        AppState { db, orders }
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        // POST reads the segment as a status label, GET/DELETE as a sale id
        .route(
            "/api/sales/{segment}",
            get(routes::sales::get_sale)
                .post(routes::sales::create_sale)
                .delete(routes::sales::delete_sale),
        )
        .route(
            "/api/sales/{sale_id}/{status}",
            put(routes::sales::update_sale),
        )
        .route(
            "/api/companies/{company_id}/sales",
            get(routes::sales::company_history),
        )
        .route(
            "/api/companies/{company_id}/sales/{folio}/document",
            put(routes::sales::issue_document),
        )
        .with_state(state)
}
