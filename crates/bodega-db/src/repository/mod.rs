//! # Repository Module
//!
//! SQL lives here and nowhere else.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Pooled repositories (reads, seeding)    Borrowed-connection stores    │
//! │  ─────────────────────────────────────   ─────────────────────────────  │
//! │  SaleRepository                          SaleStore<'c>                 │
//! │  StockRepository                         StockLedger<'c>               │
//! │  DirectoryRepository                     find_warehouse / find_client  │
//! │                                                                         │
//! │  Stores run on whatever connection they are handed, so a unit of       │
//! │  work passes its transaction and every statement shares it.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod directory;
pub mod sale;
pub mod stock;
