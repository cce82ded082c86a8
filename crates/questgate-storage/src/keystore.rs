//! Session key stores for the request pipeline.
//!
//! Two designs live side by side:
//!
//! - [`SlotKeyStore`] is the original single-slot layout: one serialized key
//!   under a fixed storage name, no per-request association. The slot holds
//!   the key of the most recently dispatched request, which only matches the
//!   most recently received response when calls never overlap. With two
//!   encrypted calls in flight the later save clobbers the earlier key and
//!   the earlier response fails to decrypt.
//! - [`CorrelatedKeyStore`] replaces the slot with a map keyed by the
//!   per-request correlation id, with TTL eviction so an abandoned call
//!   cannot pin its key forever. This is the store the pipeline uses.

use crate::{ClientStorage, StorageError, StorageKeys, StorageResult};
use questgate_crypto::SessionKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How long a correlated key entry survives without being consumed.
pub const DEFAULT_KEY_TTL: Duration = Duration::from_secs(120);

/// Store for per-request session keys.
pub trait SessionKeyStore: Send + Sync {
    /// Save the key for a request. Overwrites any previous entry.
    fn save(&self, request_id: &str, key: &SessionKey) -> StorageResult<()>;

    /// Load the key for a request, if present.
    fn load(&self, request_id: &str) -> StorageResult<Option<SessionKey>>;

    /// Remove the key for a request. Returns whether an entry existed.
    fn remove(&self, request_id: &str) -> StorageResult<bool>;
}

/// Single-slot key store over durable storage.
///
/// Ignores the request id entirely: every save overwrites the one fixed
/// slot, and any previous not-yet-consumed key is permanently lost. Correct
/// only when encrypted calls never overlap.
pub struct SlotKeyStore {
    storage: Arc<dyn ClientStorage>,
}

impl SlotKeyStore {
    /// Create a slot store over the given durable backend.
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self { storage }
    }
}

impl SessionKeyStore for SlotKeyStore {
    fn save(&self, _request_id: &str, key: &SessionKey) -> StorageResult<()> {
        self.storage.set(StorageKeys::SESSION_KEY, &key.to_base64())
    }

    fn load(&self, _request_id: &str) -> StorageResult<Option<SessionKey>> {
        match self.storage.get(StorageKeys::SESSION_KEY)? {
            Some(encoded) => {
                let key = SessionKey::from_base64(&encoded)
                    .map_err(|e| StorageError::Encoding(e.to_string()))?;
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    fn remove(&self, _request_id: &str) -> StorageResult<bool> {
        self.storage.delete(StorageKeys::SESSION_KEY)
    }
}

struct CorrelatedEntry {
    key: SessionKey,
    stored_at: Instant,
}

/// Per-request key map keyed by correlation id.
///
/// Entries are pruned on save once they exceed the TTL, and removed
/// explicitly after the matching response is opened, so the map stays
/// bounded even when calls time out or never resolve.
pub struct CorrelatedKeyStore {
    entries: Mutex<HashMap<String, CorrelatedEntry>>,
    ttl: Duration,
}

impl CorrelatedKeyStore {
    /// Create a correlated store with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_KEY_TTL)
    }

    /// Create a correlated store with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of live entries (after pruning). Mainly for diagnostics.
    pub fn len(&self) -> usize {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let ttl = self.ttl;
        entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        entries.len()
    }

    /// Whether the store currently holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CorrelatedKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionKeyStore for CorrelatedKeyStore {
    fn save(&self, request_id: &str, key: &SessionKey) -> StorageResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let ttl = self.ttl;
        entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        entries.insert(
            request_id.to_string(),
            CorrelatedEntry {
                key: key.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    fn load(&self, request_id: &str) -> StorageResult<Option<SessionKey>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        match entries.get(request_id) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Ok(Some(entry.key.clone())),
            Some(_) => Ok(None),
            None => Ok(None),
        }
    }

    fn remove(&self, request_id: &str) -> StorageResult<bool> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(entries.remove(request_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    #[test]
    fn slot_store_roundtrip() {
        let store = SlotKeyStore::new(Arc::new(MemoryStorage::new()));
        let key = SessionKey::generate();

        store.save("req-1", &key).unwrap();
        assert_eq!(store.load("req-1").unwrap(), Some(key));
    }

    #[test]
    fn slot_store_ignores_request_id() {
        // The defining property of the single-slot design: the id plays no
        // part, so a later save clobbers an earlier key.
        let store = SlotKeyStore::new(Arc::new(MemoryStorage::new()));
        let key_a = SessionKey::generate();
        let key_b = SessionKey::generate();

        store.save("req-a", &key_a).unwrap();
        store.save("req-b", &key_b).unwrap();

        assert_eq!(store.load("req-a").unwrap(), Some(key_b.clone()));
        assert_eq!(store.load("req-b").unwrap(), Some(key_b));
    }

    #[test]
    fn slot_store_empty_slot_is_absent() {
        let store = SlotKeyStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(store.load("anything").unwrap(), None);
        assert!(!store.remove("anything").unwrap());
    }

    #[test]
    fn slot_store_persists_through_backend() {
        let backend = Arc::new(MemoryStorage::new());
        let key = SessionKey::generate();

        SlotKeyStore::new(Arc::clone(&backend) as Arc<dyn ClientStorage>)
            .save("req-1", &key)
            .unwrap();

        // A second store over the same backend sees the same slot.
        let other = SlotKeyStore::new(backend);
        assert_eq!(other.load("req-2").unwrap(), Some(key));
    }

    #[test]
    fn slot_store_corrupted_slot_errors() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set(StorageKeys::SESSION_KEY, "not base64!!!").unwrap();

        let store = SlotKeyStore::new(backend);
        assert!(matches!(
            store.load("req-1"),
            Err(StorageError::Encoding(_))
        ));
    }

    #[test]
    fn correlated_store_keeps_keys_separate() {
        let store = CorrelatedKeyStore::new();
        let key_a = SessionKey::generate();
        let key_b = SessionKey::generate();

        store.save("req-a", &key_a).unwrap();
        store.save("req-b", &key_b).unwrap();

        assert_eq!(store.load("req-a").unwrap(), Some(key_a));
        assert_eq!(store.load("req-b").unwrap(), Some(key_b));
    }

    #[test]
    fn correlated_store_remove_evicts_entry() {
        let store = CorrelatedKeyStore::new();
        let key = SessionKey::generate();

        store.save("req-1", &key).unwrap();
        assert!(store.remove("req-1").unwrap());
        assert_eq!(store.load("req-1").unwrap(), None);
        assert!(!store.remove("req-1").unwrap());
    }

    #[test]
    fn correlated_store_expired_entry_is_absent() {
        let store = CorrelatedKeyStore::with_ttl(Duration::from_millis(0));
        let key = SessionKey::generate();

        store.save("req-1", &key).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.load("req-1").unwrap(), None);
    }

    #[test]
    fn correlated_store_prunes_on_save() {
        let store = CorrelatedKeyStore::with_ttl(Duration::from_millis(0));

        store.save("req-1", &SessionKey::generate()).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        store.save("req-2", &SessionKey::generate()).unwrap();

        // req-1 expired and was pruned; only the TTL-0 req-2 remains until
        // the next prune.
        let entries = store.entries.lock().unwrap();
        assert!(!entries.contains_key("req-1"));
    }

    #[test]
    fn correlated_store_len_counts_live_entries() {
        let store = CorrelatedKeyStore::new();
        assert!(store.is_empty());

        store.save("req-1", &SessionKey::generate()).unwrap();
        store.save("req-2", &SessionKey::generate()).unwrap();
        assert_eq!(store.len(), 2);
    }
}
