//! # Sale Orders
//!
//! The sale engine: [`SaleOrderService`] opens a transaction per mutation and
//! hands its connection to [`SaleLineSet`], which drives the
//! [`StockLedger`](crate::repository::stock::StockLedger).

pub mod line_set;
pub mod service;

pub use line_set::SaleLineSet;
pub use service::{EngineSettings, SaleOrderService};
