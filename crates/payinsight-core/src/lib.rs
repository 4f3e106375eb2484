//! PayInsight Core Library
//!
//! Shared functionality for the merchant settlement insights service:
//! - Layered configuration (defaults, TOML, environment)
//! - Settlement CSV parsing with date coercion and type inference
//! - SQLite store with pooled connections and a destructive import
//! - Derivation of the `transactions` and `refunds` query tables
//! - Keyword-routed insight engine with Plotly-compatible chart specs

pub mod config;
pub mod db;
pub mod derive;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;

pub use config::{Config, ImportConfig, ServerSettings, StoreConfig};
pub use db::{Database, RefundBucket, SalesBucket};
pub use error::{Error, Result};
pub use import::{
    import_settlements, parse_settlements, read_settlement_path, store_settlements,
};
pub use insights::{route, InsightEngine, RefundWindow, Route};
pub use models::{
    ImportSummary, InsightResult, PaymentMethod, RefundRecord, SettlementBatch, TablePreview,
    TransactionRecord, TransactionStatus,
};
