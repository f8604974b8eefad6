use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::Subscription;
use crate::store::{StoreKey, StoreValue};

/// A callback invoked with the new value of a key.
pub type Listener<V> = Arc<dyn Fn(&V) + Send + Sync>;

/// Identity comparison on the allocation, ignoring vtable pointers.
fn same_listener<V>(a: &Listener<V>, b: &Listener<V>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Keyed, ordered listener lists.
///
/// Order is only meaningful within one key's list. Removal filters by
/// identity, so a listener registered twice under a key fires twice and is
/// removed in one go.
pub struct ListenerRegistry<K, V> {
    lists: RwLock<HashMap<K, Vec<Listener<V>>>>,
}

impl<K: StoreKey, V: StoreValue> ListenerRegistry<K, V> {
    /// Create a registry with an empty list for every key.
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a K>) -> Self {
        let keys = keys.into_iter();
        let mut lists = HashMap::with_capacity(keys.size_hint().0);
        for key in keys {
            lists.insert(key.clone(), Vec::new());
        }
        Self {
            lists: RwLock::new(lists),
        }
    }

    /// Append `listener` to the list of every key in `keys`.
    pub fn add(&self, keys: &[K], listener: &Listener<V>) {
        let mut lists = self.lists.write();
        for key in keys {
            lists
                .entry(key.clone())
                .or_default()
                .push(Arc::clone(listener));
        }
    }

    /// Remove every occurrence of `listener` from the lists of `keys`.
    pub fn remove(&self, keys: &[K], listener: &Listener<V>) {
        let mut lists = self.lists.write();
        for key in keys {
            if let Some(list) = lists.get_mut(key) {
                list.retain(|l| !same_listener(l, listener));
            }
        }
    }

    /// Clone of the listeners currently registered at `key`, in order.
    ///
    /// Callers invoke the returned listeners without holding the registry
    /// lock, so listeners may subscribe or unsubscribe while being notified.
    pub fn listeners(&self, key: &K) -> Vec<Listener<V>> {
        self.lists.read().get(key).cloned().unwrap_or_default()
    }

    pub fn len(&self, key: &K) -> usize {
        self.lists.read().get(key).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, key: &K) -> bool {
        self.len(key) == 0
    }

    /// Register `listener` under `keys` and return the guard removing it.
    pub fn subscribe(self: &Arc<Self>, keys: Vec<K>, listener: Listener<V>) -> Subscription {
        self.add(&keys, &listener);
        debug!(keys = ?keys, "listener subscribed");

        let registry = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(&keys, &listener);
                debug!(keys = ?keys, "listener unsubscribed");
            }
        })
    }
}
