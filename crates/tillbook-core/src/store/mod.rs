//! Persistent key-value storage and the local store built on top of it.
//!
//! `KeyValueStore` is the seam between the application and wherever its
//! state lives on disk. `FileStore` keeps one file per key in a directory;
//! `MemoryStore` keeps everything in process for tests and throwaway runs.
//!
//! `LocalStore` owns the staff name, the backend endpoint and the offline
//! queue. Cache entries share the same backing store under their own key
//! prefix (see `crate::cache`).

pub mod file;
pub mod local;
pub mod memory;

use thiserror::Error;

pub use file::FileStore;
pub use local::LocalStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access store key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode value: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// String-valued persistent storage, addressed by key.
///
/// Access is expected from one logical caller at a time; implementations
/// only need to be safe to share, not to order concurrent writers.
pub trait KeyValueStore: Send + Sync {
    /// Value for `key`, or `None` if it was never set or has been removed.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Every key currently present.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}
