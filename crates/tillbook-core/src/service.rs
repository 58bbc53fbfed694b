//! The till: submission with offline fallback, and cached reads.
//!
//! `Till` is what a form layer talks to. It owns the local store, the cache
//! and (when an endpoint is configured) a backend, and applies the fault
//! policy:
//!
//! - writes that cannot be dispatched are parked in the offline queue and
//!   reported as a warning, never as a hard error
//! - cash balance and summary reads degrade to zeroed or absent results
//! - entries listings surface their errors to the caller
//! - invalid input is rejected before any network call

use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, Backend, BackendClient, Submitted};
use crate::cache::{CacheEntry, CacheManager};
use crate::error::ValidationError;
use crate::models::{
    CashBalanceSnapshot, EntriesTable, EntryKind, ExpenseDraft, ExpenseEntry, MonthlySummary,
    OfflineQueueItem, SalesEntry, SheetKind,
};
use crate::reconcile::QuickExpenses;
use crate::session::Session;
use crate::store::{LocalStore, StoreError};
use crate::utils::MonthKey;

/// Why a submission ended up in the offline queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfflineReason {
    /// No endpoint has been set up.
    NotConfigured,
    /// The write could not be dispatched.
    Transport(String),
}

/// Result of a submission attempt. Neither variant means the backend has
/// stored anything.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Every write was dispatched.
    Submitted(Vec<Submitted>),
    /// `queued` entries were parked in the offline queue.
    SavedOffline { reason: OfflineReason, queued: usize },
}

impl SubmitOutcome {
    pub fn is_offline(&self) -> bool {
        matches!(self, SubmitOutcome::SavedOffline { .. })
    }

    /// The message shown to staff after a submit.
    pub fn message(&self) -> &'static str {
        match self {
            SubmitOutcome::Submitted(_) => "Saved successfully!",
            SubmitOutcome::SavedOffline {
                reason: OfflineReason::NotConfigured,
                ..
            } => "Saved offline. Please complete setup.",
            SubmitOutcome::SavedOffline {
                reason: OfflineReason::Transport(_),
                ..
            } => "Saved offline. Will sync when online.",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("Apps Script URL not configured. Please complete setup.")]
    NotConfigured,

    #[error("No data found for this month")]
    NoData,
}

pub struct Till<B> {
    store: LocalStore,
    cache: CacheManager,
    session: Session,
    backend: Option<B>,
}

impl Till<BackendClient> {
    /// Build a till for `session`, connecting an HTTP backend if the session
    /// has an endpoint.
    pub fn connect(store: LocalStore, session: Session, timeout: Duration) -> Result<Self, ApiError> {
        let backend = session
            .endpoint_url()
            .map(|url| BackendClient::with_timeout(url, timeout))
            .transpose()?;
        let cache = CacheManager::new(store.backing());
        Ok(Self::new(store, cache, session, backend))
    }
}

impl<B: Backend> Till<B> {
    pub fn new(store: LocalStore, cache: CacheManager, session: Session, backend: Option<B>) -> Self {
        Self {
            store,
            cache,
            session,
            backend,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    // ===== Writes =====

    fn queue_offline(&self, sales: Option<&SalesEntry>, expenses: &[ExpenseEntry]) -> usize {
        if let Some(entry) = sales {
            self.store.save_offline(EntryKind::Sales, entry);
        }
        for expense in expenses {
            self.store.save_offline(EntryKind::Expense, expense);
        }
        usize::from(sales.is_some()) + expenses.len()
    }

    /// Submit the day's sales and, once that has been dispatched, each
    /// positive quick expense as a cash expense.
    ///
    /// If the sales write fails, it and its quick expenses are all queued.
    /// If only some quick expenses fail, just those are queued.
    pub async fn submit_sales(&self, entry: &SalesEntry, quick: &QuickExpenses) -> SubmitOutcome {
        let expenses = quick.entries(entry.date, &entry.staff_name);

        let Some(backend) = &self.backend else {
            let queued = self.queue_offline(Some(entry), &expenses);
            info!(queued, "No endpoint configured, sales saved offline");
            return SubmitOutcome::SavedOffline {
                reason: OfflineReason::NotConfigured,
                queued,
            };
        };

        let sales_receipt = match backend.submit_sales(entry).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(date = %entry.date, error = %e, "Failed to submit sales, saving offline");
                let queued = self.queue_offline(Some(entry), &expenses);
                return SubmitOutcome::SavedOffline {
                    reason: OfflineReason::Transport(e.to_string()),
                    queued,
                };
            }
        };

        let results = join_all(expenses.iter().map(|e| backend.submit_expense(e))).await;

        let mut receipts = vec![sales_receipt];
        let mut failed = Vec::new();
        let mut first_error = None;
        for (expense, result) in expenses.iter().zip(results) {
            match result {
                Ok(receipt) => receipts.push(receipt),
                Err(e) => {
                    warn!(
                        category = %expense.category,
                        error = %e,
                        "Failed to submit quick expense, saving offline"
                    );
                    first_error.get_or_insert_with(|| e.to_string());
                    failed.push(expense.clone());
                }
            }
        }

        match first_error {
            Some(message) => SubmitOutcome::SavedOffline {
                reason: OfflineReason::Transport(message),
                queued: self.queue_offline(None, &failed),
            },
            None => {
                debug!(writes = receipts.len(), "Sales submitted");
                SubmitOutcome::Submitted(receipts)
            }
        }
    }

    /// Validate and submit an expense. Validation failures are returned
    /// before anything is sent or queued.
    pub async fn submit_expense(&self, draft: &ExpenseDraft) -> Result<SubmitOutcome, ValidationError> {
        let entry = draft.validate(self.session.submitting_staff())?;

        let Some(backend) = &self.backend else {
            let queued = self.queue_offline(None, std::slice::from_ref(&entry));
            info!("No endpoint configured, expense saved offline");
            return Ok(SubmitOutcome::SavedOffline {
                reason: OfflineReason::NotConfigured,
                queued,
            });
        };

        Ok(match backend.submit_expense(&entry).await {
            Ok(receipt) => SubmitOutcome::Submitted(vec![receipt]),
            Err(e) => {
                warn!(category = %entry.category, error = %e, "Failed to submit expense, saving offline");
                SubmitOutcome::SavedOffline {
                    reason: OfflineReason::Transport(e.to_string()),
                    queued: self.queue_offline(None, std::slice::from_ref(&entry)),
                }
            }
        })
    }

    /// Submit an adjustments record. Failures are returned; adjustments are
    /// never queued offline.
    pub async fn submit_adjustments(&self, entry: &Value) -> Result<Submitted, ApiError> {
        let backend = self.backend.as_ref().ok_or(ApiError::NotConfigured)?;
        backend.submit_adjustments(entry).await
    }

    // ===== Reads =====

    /// The day's cash baseline. Every failure, including a missing
    /// endpoint, reads as a zeroed snapshot.
    pub async fn cash_balance(&self, date: NaiveDate) -> CashBalanceSnapshot {
        match &self.backend {
            Some(backend) => backend.fetch_cash_balance(date).await.unwrap_or_default(),
            None => {
                debug!("No endpoint configured, using zeroed cash balance");
                CashBalanceSnapshot::zeroed()
            }
        }
    }

    /// The cached summary for `month`, to show while a refresh runs.
    pub fn cached_monthly_summary(&self, month: &MonthKey) -> Option<CacheEntry<MonthlySummary>> {
        self.cache.load_summary(month)
    }

    /// Whether a refresh is worth issuing for `month`.
    pub fn summary_needs_refresh(&self, month: &MonthKey) -> bool {
        !self.cache.is_summary_fresh(month)
    }

    /// Fetch the summary for `month` and cache it.
    ///
    /// Returns `Ok(None)` when the fetch failed but a cached value is still
    /// available to show; `NoData` only when there is nothing to show at all.
    pub async fn refresh_monthly_summary(
        &self,
        month: &MonthKey,
    ) -> Result<Option<MonthlySummary>, SummaryError> {
        let backend = self.backend.as_ref().ok_or(SummaryError::NotConfigured)?;

        match backend.fetch_monthly_summary(month).await {
            Some(summary) => {
                self.cache.save_summary(month, &summary);
                Ok(Some(summary))
            }
            None if self.cache.load_summary(month).is_some() => {
                debug!(month = %month, "Summary refresh failed, keeping cached value");
                Ok(None)
            }
            None => Err(SummaryError::NoData),
        }
    }

    /// A raw sheet listing. Errors are the caller's to display.
    pub async fn entries(&self, sheet: SheetKind, month: &MonthKey) -> Result<EntriesTable, ApiError> {
        let backend = self.backend.as_ref().ok_or(ApiError::NotConfigured)?;
        backend.fetch_entries(sheet, month).await
    }

    // ===== Local state =====

    pub fn offline_queue(&self) -> Vec<OfflineQueueItem> {
        self.store.offline_queue()
    }

    pub fn clear_offline_queue(&self) -> Result<(), StoreError> {
        self.store.clear_offline_queue()
    }

    pub fn clear_cache(&self) {
        self.cache.clear_all()
    }
}
