use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use super::{Snapshot, Synchronizer};
use crate::error::SyncError;
use crate::store::{Action, StoreKey, StoreValue};

struct StorageInner<K, V> {
    entries: RwLock<HashMap<K, V>>,
    setters: Mutex<HashMap<K, Vec<Action<K, V>>>>,
    writes: AtomicUsize,
}

/// An in-memory external store shared by any number of stores.
///
/// Cloning creates a new handle to the same entries.
pub struct MemoryStorage<K, V> {
    inner: Arc<StorageInner<K, V>>,
}

impl<K: StoreKey, V: StoreValue> MemoryStorage<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StorageInner {
                entries: RwLock::new(HashMap::new()),
                setters: Mutex::new(HashMap::new()),
                writes: AtomicUsize::new(0),
            }),
        }
    }

    /// A synchronizer over this storage using `fallback` when a key is missing.
    pub fn synchronizer(&self, fallback: V) -> MemorySynchronizer<K, V> {
        MemorySynchronizer {
            storage: self.clone(),
            fallback,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.entries.read().get(key).cloned()
    }

    /// Write without notifying subscribed stores.
    pub fn insert(&self, key: K, value: V) {
        self.inner.entries.write().insert(key, value);
    }

    /// Write and push the value into every store subscribed to `key`.
    pub fn publish(&self, key: &K, value: V) {
        self.insert(key.clone(), value.clone());

        let setters = {
            let mut all = self.inner.setters.lock();
            match all.get_mut(key) {
                Some(setters) => {
                    setters.retain(Action::is_attached);
                    setters.clone()
                }
                None => Vec::new(),
            }
        };
        debug!(key = ?key, stores = setters.len(), "publishing external change");
        for setter in setters {
            setter.set(value.clone());
        }
    }

    /// Number of writes received from stores.
    pub fn writes(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }
}

impl<K: StoreKey, V: StoreValue> Default for MemoryStorage<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for MemoryStorage<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A [`Synchronizer`] backed by a [`MemoryStorage`].
///
/// Reads are synchronous. A key missing from the storage is a read failure,
/// so the store falls back and writes the fallback into the storage.
pub struct MemorySynchronizer<K, V> {
    storage: MemoryStorage<K, V>,
    fallback: V,
}

impl<K: StoreKey, V: StoreValue> MemorySynchronizer<K, V> {
    pub fn storage(&self) -> &MemoryStorage<K, V> {
        &self.storage
    }
}

impl<K: StoreKey, V: StoreValue> Synchronizer<K, V> for MemorySynchronizer<K, V> {
    fn fallback(&self) -> V {
        self.fallback.clone()
    }

    fn get_snapshot(&self, key: &K) -> Result<Snapshot<V>, SyncError> {
        self.storage
            .get(key)
            .map(Snapshot::Ready)
            .ok_or_else(|| SyncError::Missing(format!("{key:?}")))
    }

    fn update(&self, value: &V, key: &K) {
        self.storage.insert(key.clone(), value.clone());
        self.storage.inner.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn subscribe(&self, setter: Action<K, V>, key: &K) {
        let mut setters = self.storage.inner.setters.lock();
        let setters = setters.entry(key.clone()).or_default();
        setters.retain(Action::is_attached);
        setters.push(setter);
    }
}
