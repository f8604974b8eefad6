use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

use super::{StoreInner, StoreKey, StoreValue};

/// What an [`Action`] does to its key.
pub enum Dispatch<V> {
    /// Replace the value.
    Value(V),
    /// Compute the new value from the current one.
    Update(Box<dyn FnOnce(&V) -> V + Send>),
}

impl<V> Dispatch<V> {
    /// Functional update from the current value.
    pub fn update<F>(f: F) -> Self
    where
        F: FnOnce(&V) -> V + Send + 'static,
    {
        Dispatch::Update(Box::new(f))
    }
}

impl<V> From<V> for Dispatch<V> {
    fn from(value: V) -> Self {
        Dispatch::Value(value)
    }
}

impl<V: fmt::Debug> fmt::Debug for Dispatch<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Dispatch::Update(_) => f.write_str("Update(..)"),
        }
    }
}

struct ActionInner<K, V> {
    key: K,
    store: Weak<StoreInner<K, V>>,
}

/// The setter for one key of a store.
///
/// Actions are created once per key when the store is built. Every handle
/// obtained from the store for a key is a clone of that one action, so
/// [`ptr_eq`](Self::ptr_eq) holds between them for the store's lifetime.
/// An action does not keep its store alive.
pub struct Action<K, V> {
    inner: Arc<ActionInner<K, V>>,
}

impl<K: StoreKey, V: StoreValue> Action<K, V> {
    pub(crate) fn new(key: K, store: Weak<StoreInner<K, V>>) -> Self {
        Self {
            inner: Arc::new(ActionInner { key, store }),
        }
    }

    /// The key this action writes.
    pub fn key(&self) -> &K {
        &self.inner.key
    }

    /// Write the key and notify its listeners, in registration order, before
    /// returning.
    pub fn dispatch(&self, dispatch: impl Into<Dispatch<V>>) {
        match self.inner.store.upgrade() {
            Some(store) => store.dispatch(&self.inner.key, dispatch.into()),
            None => debug!(key = ?self.inner.key, "dispatch after store was dropped"),
        }
    }

    /// Set a new value.
    pub fn set(&self, value: V) {
        self.dispatch(Dispatch::Value(value));
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&V) -> V + Send + 'static,
    {
        self.dispatch(Dispatch::update(f));
    }

    /// Whether the store this action writes is still alive.
    pub(crate) fn is_attached(&self) -> bool {
        self.inner.store.strong_count() > 0
    }

    /// Whether both handles are the same action.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<K, V> Clone for Action<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Action<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("key", &self.inner.key)
            .field("attached", &(self.inner.store.strong_count() > 0))
            .finish()
    }
}
