//! `ledgerlens-recon` — ledger consistency and reporting engine.
//!
//! Pure engine crate: receives pre-loaded records, returns the audit result.
//! No CLI or network dependencies.

pub mod category;
pub mod chain;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod timeseries;

pub use config::AuditConfig;
pub use engine::{load_csv_rows, run};
pub use error::AuditError;
pub use model::{AuditResult, LedgerRecord, Verdict};
