//! Local caching of backend query results.
//!
//! This module provides the `CacheManager` for storing and retrieving
//! query results in the shared key-value store. Entries expire five minutes
//! after they are written and are considered fresh for the first minute.
//!
//! Cached data types include:
//! - Monthly summaries, keyed by month

pub mod manager;

pub use manager::{CacheEntry, CacheManager};
