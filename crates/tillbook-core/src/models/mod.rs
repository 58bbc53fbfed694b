//! Data models for the entries staff record and the figures read back.
//!
//! - `SalesEntry`, `CashBalanceSnapshot`: daily takings and the cash baseline
//! - `ExpenseEntry`, `ExpenseCategory`, `PaymentMethod`: categorised expenses
//! - `MonthlySummary`, `EntriesTable`, `SheetKind`: read-side payloads
//! - `OfflineQueueItem`, `EntryKind`: submissions parked while offline

pub mod amount;
pub mod expense;
pub mod queue;
pub mod sales;
pub mod summary;

pub use amount::{parse_amount, parse_figure};
pub use expense::{fruit_sum, total_expense, ExpenseCategory, ExpenseDraft, ExpenseEntry, PaymentMethod};
pub use queue::{EntryKind, OfflineQueueItem};
pub use sales::{CashBalanceSnapshot, SalesEntry};
pub use summary::{EntriesTable, MonthlySummary, SheetKind};
