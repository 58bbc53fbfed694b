use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{KeyValueStore, StoreError};
use crate::models::{EntryKind, OfflineQueueItem};

const KEY_STAFF_NAME: &str = "staff_name";
const KEY_ENDPOINT_URL: &str = "endpoint_url";
const KEY_OFFLINE_QUEUE: &str = "offline_queue";

/// Unparseable queue contents are moved to `offline_queue.corrupt.<millis>`.
const KEY_CORRUPT_QUEUE_PREFIX: &str = "offline_queue.corrupt.";

/// Staff identity, backend endpoint and the offline queue.
///
/// Clone is cheap: clones share the same backing store.
#[derive(Clone)]
pub struct LocalStore {
    store: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The backing store, shared with the cache.
    pub fn backing(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    fn read_string(&self, key: &str) -> String {
        match self.store.get(key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read local store");
                String::new()
            }
        }
    }

    // ===== Staff =====

    /// Saved staff name, empty if unset.
    pub fn staff_name(&self) -> String {
        self.read_string(KEY_STAFF_NAME)
    }

    pub fn save_staff_name(&self, name: &str) -> Result<(), StoreError> {
        self.store.set(KEY_STAFF_NAME, name.trim())
    }

    // ===== Endpoint =====

    /// Saved backend endpoint, empty if unset.
    pub fn endpoint_url(&self) -> String {
        self.read_string(KEY_ENDPOINT_URL)
    }

    pub fn save_endpoint_url(&self, url: &str) -> Result<(), StoreError> {
        self.store.set(KEY_ENDPOINT_URL, url.trim())
    }

    // ===== Offline queue =====

    /// Append an entry to the offline queue.
    ///
    /// Never fails the caller: encoding and storage faults are logged and
    /// the entry is dropped. Entries already queued are never discarded; if
    /// the stored queue cannot be read it is left alone, and if it cannot be
    /// parsed it is moved to a backup key before a new queue is started.
    pub fn save_offline<T: Serialize>(&self, kind: EntryKind, entry: &T) {
        if let Err(e) = self.try_save_offline(kind, entry) {
            warn!(kind = %kind, error = %e, "Failed to save entry to offline queue");
        }
    }

    fn try_save_offline<T: Serialize>(&self, kind: EntryKind, entry: &T) -> Result<(), StoreError> {
        let data = serde_json::to_value(entry)?;
        let item = serde_json::to_value(OfflineQueueItem::new(kind, data))?;

        // Items are kept as raw JSON so that one unreadable item is carried
        // forward untouched instead of being rewritten away.
        let mut queue = match self.store.get(KEY_OFFLINE_QUEUE)? {
            Some(contents) => match serde_json::from_str::<Vec<Value>>(&contents) {
                Ok(queue) => queue,
                Err(e) => {
                    let backup =
                        format!("{}{}", KEY_CORRUPT_QUEUE_PREFIX, Utc::now().timestamp_millis());
                    self.store.set(&backup, &contents)?;
                    warn!(backup = %backup, error = %e, "Offline queue is corrupt, moved aside");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        queue.push(item);
        self.store.set(KEY_OFFLINE_QUEUE, &serde_json::to_string(&queue)?)?;
        debug!(kind = %kind, queued = queue.len(), "Entry saved to offline queue");
        Ok(())
    }

    /// Queued items in insertion order. Missing or corrupt storage reads as
    /// an empty queue; individual unreadable items are skipped.
    pub fn offline_queue(&self) -> Vec<OfflineQueueItem> {
        let contents = match self.store.get(KEY_OFFLINE_QUEUE) {
            Ok(Some(contents)) => contents,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read offline queue");
                return Vec::new();
            }
        };

        let raw: Vec<Value> = match serde_json::from_str(&contents) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Offline queue is corrupt, treating as empty");
                return Vec::new();
            }
        };

        raw.into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable offline queue item");
                    None
                }
            })
            .collect()
    }

    pub fn clear_offline_queue(&self) -> Result<(), StoreError> {
        self.store.remove(KEY_OFFLINE_QUEUE)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use chrono::NaiveDate;

    use super::*;
    use crate::models::{ExpenseCategory, ExpenseEntry, SalesEntry};
    use crate::store::{FileStore, MemoryStore};

    fn local() -> LocalStore {
        LocalStore::new(Arc::new(MemoryStore::new()))
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    /// A memory store whose next read can be made to fail once.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_next_get: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_next_get.swap(false, Ordering::SeqCst) {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Interrupted, "transient"),
                });
            }
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
        fn keys(&self) -> Result<Vec<String>, StoreError> {
            self.inner.keys()
        }
    }

    /// A store that rejects every write.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn keys(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_unset_values_are_empty() {
        let store = local();
        assert_eq!(store.staff_name(), "");
        assert_eq!(store.endpoint_url(), "");
        assert!(store.offline_queue().is_empty());
    }

    #[test]
    fn test_staff_and_endpoint_round_trip() {
        let store = local();
        store.save_staff_name("  Meera ").expect("save staff");
        store
            .save_endpoint_url("https://script.google.com/macros/s/abc/exec")
            .expect("save endpoint");
        assert_eq!(store.staff_name(), "Meera");
        assert_eq!(store.endpoint_url(), "https://script.google.com/macros/s/abc/exec");
    }

    #[test]
    fn test_offline_queue_preserves_order() {
        let store = local();
        let a = SalesEntry::empty(day(), "Ravi");
        let b = ExpenseEntry::cash(day(), "Ravi", ExpenseCategory::Oil, 120.0);

        store.save_offline(EntryKind::Sales, &a);
        store.save_offline(EntryKind::Expense, &b);

        let queue = store.offline_queue();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].sales(), Some(a));
        assert_eq!(queue[1].expense(), Some(b));
    }

    #[test]
    fn test_offline_queue_does_not_dedup() {
        let store = local();
        let entry = SalesEntry::empty(day(), "Ravi");
        store.save_offline(EntryKind::Sales, &entry);
        store.save_offline(EntryKind::Sales, &entry);
        assert_eq!(store.offline_queue().len(), 2);
    }

    #[test]
    fn test_clear_offline_queue() {
        let store = local();
        store.save_offline(EntryKind::Sales, &SalesEntry::empty(day(), "Ravi"));
        store.clear_offline_queue().expect("clear");
        assert!(store.offline_queue().is_empty());
        store.clear_offline_queue().expect("clearing an empty queue succeeds");
    }

    #[test]
    fn test_corrupt_queue_is_moved_aside_on_save() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(KEY_OFFLINE_QUEUE, "[{not json").expect("set");
        let store = LocalStore::new(backing.clone());
        assert!(store.offline_queue().is_empty());

        store.save_offline(EntryKind::Sales, &SalesEntry::empty(day(), "Ravi"));

        assert_eq!(store.offline_queue().len(), 1);
        let backups: Vec<String> = backing
            .keys()
            .expect("keys")
            .into_iter()
            .filter(|k| k.starts_with(KEY_CORRUPT_QUEUE_PREFIX))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(backing.get(&backups[0]).expect("get").as_deref(), Some("[{not json"));
    }

    #[test]
    fn test_unreadable_item_is_kept_on_save() {
        let backing = Arc::new(MemoryStore::new());
        let good = SalesEntry {
            cash_sale: 500.0,
            ..SalesEntry::empty(day(), "Ravi")
        };
        let good_data = serde_json::to_value(&good).expect("encode entry");
        let good_item = serde_json::to_value(OfflineQueueItem::new(EntryKind::Sales, good_data))
            .expect("encode item");
        let bad_item = serde_json::json!({"type": "sales", "data": {}, "timestamp": "not-a-time"});
        let contents = serde_json::to_string(&[good_item, bad_item.clone()]).expect("encode");
        backing.set(KEY_OFFLINE_QUEUE, &contents).expect("set");
        let store = LocalStore::new(backing.clone());

        store.save_offline(EntryKind::Sales, &SalesEntry::empty(day(), "Ravi"));

        let stored = backing.get(KEY_OFFLINE_QUEUE).expect("get").expect("queue");
        let raw: Vec<Value> = serde_json::from_str(&stored).expect("queue is a JSON array");
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[1], bad_item);

        let queue = store.offline_queue();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].sales(), Some(good));
    }

    #[test]
    fn test_read_fault_never_overwrites_queue() {
        let backing = Arc::new(FlakyStore::default());
        let store = LocalStore::new(backing.clone());
        for _ in 0..3 {
            store.save_offline(EntryKind::Sales, &SalesEntry::empty(day(), "Ravi"));
        }

        backing.fail_next_get.store(true, Ordering::SeqCst);
        store.save_offline(EntryKind::Sales, &SalesEntry::empty(day(), "Ravi"));
        assert_eq!(store.offline_queue().len(), 3);

        store.save_offline(EntryKind::Sales, &SalesEntry::empty(day(), "Ravi"));
        assert_eq!(store.offline_queue().len(), 4);
    }

    #[test]
    fn test_save_offline_swallows_storage_faults() {
        let store = LocalStore::new(Arc::new(ReadOnlyStore));
        store.save_offline(EntryKind::Sales, &SalesEntry::empty(day(), "Ravi"));
        assert!(store.offline_queue().is_empty());
    }

    #[test]
    fn test_queue_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let open = || {
            LocalStore::new(Arc::new(FileStore::new(dir.path().to_path_buf()).expect("store")))
        };

        open().save_offline(EntryKind::Sales, &SalesEntry::empty(day(), "Ravi"));
        let queue = open().offline_queue();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].kind, EntryKind::Sales);
    }
}
