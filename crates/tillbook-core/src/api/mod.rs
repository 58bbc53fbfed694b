//! Client for the spreadsheet-backed aggregation service.
//!
//! The service is a single web-app URL. Reads are query-string GETs
//! (`?type=cashBalance&date=…`, `?type=monthlySummary&month=…`,
//! `?type=entries&sheet=…&month=…`) answering `{success, …}`; writes are a
//! POSTed `{type, entry}` body whose outcome the service does not report.
//!
//! `Backend` is the contract the rest of the crate depends on;
//! `BackendClient` implements it over HTTP.

pub mod client;
pub mod error;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

pub use client::BackendClient;
pub use error::ApiError;

use crate::models::{
    CashBalanceSnapshot, EntriesTable, EntryKind, ExpenseEntry, MonthlySummary, SalesEntry,
    SheetKind,
};
use crate::utils::MonthKey;

/// Receipt for a write that was dispatched.
///
/// This is not a delivery confirmation: the backend accepts writes without
/// reporting whether it stored them.
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub kind: EntryKind,
    pub dispatched_at: DateTime<Utc>,
}

impl Submitted {
    pub fn now(kind: EntryKind) -> Self {
        Self {
            kind,
            dispatched_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Dispatch a sales entry. Errors are returned, never queued here.
    async fn submit_sales(&self, entry: &SalesEntry) -> Result<Submitted, ApiError>;

    /// Dispatch an expense entry. Errors are returned, never queued here.
    async fn submit_expense(&self, entry: &ExpenseEntry) -> Result<Submitted, ApiError>;

    /// Dispatch a free-form adjustments record.
    async fn submit_adjustments(&self, entry: &Value) -> Result<Submitted, ApiError>;

    /// Cash position for `date`.
    ///
    /// `None` when the backend has no balance for the date. Transport and
    /// parse failures yield a zeroed snapshot instead of an error.
    async fn fetch_cash_balance(&self, date: NaiveDate) -> Option<CashBalanceSnapshot>;

    /// Month totals, or `None` on any failure.
    async fn fetch_monthly_summary(&self, month: &MonthKey) -> Option<MonthlySummary>;

    /// Raw sheet listing. Unlike the other reads, failures are returned.
    async fn fetch_entries(
        &self,
        sheet: SheetKind,
        month: &MonthKey,
    ) -> Result<EntriesTable, ApiError>;
}
