//! Items parked in the offline queue.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::{ExpenseEntry, SalesEntry};

/// The kind of entry a write carries. `Adjustments` is never queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Sales,
    Expense,
    Adjustments,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Sales => "sales",
            EntryKind::Expense => "expense",
            EntryKind::Adjustments => "adjustments",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One queued submission. Persisted as `{type, data, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineQueueItem {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl OfflineQueueItem {
    pub fn new(kind: EntryKind, data: Value) -> Self {
        Self {
            kind,
            data,
            timestamp: Utc::now(),
        }
    }

    fn decode<T: DeserializeOwned>(&self, kind: EntryKind) -> Option<T> {
        if self.kind != kind {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }

    /// The queued sales entry, if this item holds one.
    pub fn sales(&self) -> Option<SalesEntry> {
        self.decode(EntryKind::Sales)
    }

    /// The queued expense entry, if this item holds one.
    pub fn expense(&self) -> Option<ExpenseEntry> {
        self.decode(EntryKind::Expense)
    }
}
