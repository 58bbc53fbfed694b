//! Tillbook Core - shared library for recording a shop's daily takings.
//!
//! This crate contains everything a front end needs to record sales and
//! expenses against a spreadsheet-backed service:
//! - `models`: entries, cash snapshots, summaries and the offline queue item
//! - `reconcile`: the live cash check shown on the sales form
//! - `store`: persistent key-value storage and the local store
//! - `cache`: time-limited caching of backend reads
//! - `api`: the backend contract and its HTTP client
//! - `service`: submission with offline fallback, and cached reads
//! - `session`, `setup`, `config`: who is submitting, and where to

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod service;
pub mod session;
pub mod setup;
pub mod store;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use api::{ApiError, Backend, BackendClient, Submitted};
pub use cache::{CacheEntry, CacheManager};
pub use config::Config;
pub use error::ValidationError;
pub use models::*;
pub use reconcile::{CashCheck, QuickExpenses, Reconciliation, SalesForm};
pub use service::{OfflineReason, SubmitOutcome, SummaryError, Till};
pub use session::Session;
pub use setup::{configure_endpoint, validate_endpoint_url, SetupError};
pub use store::{FileStore, KeyValueStore, LocalStore, MemoryStore, StoreError};
pub use utils::{format_currency, MonthKey};
