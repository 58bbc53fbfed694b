//! Utility functions for date handling and display formatting.

pub mod dates;
pub mod format;

// Re-export commonly used items at module level
pub use dates::{next_day, parse_day, previous_day, today, MonthKey};
pub use format::{format_currency, truncate_string};
