use futures::future::{join_all, BoxFuture, FutureExt};
use std::fmt;
use std::sync::{Arc, Weak};

use super::{Action, Dispatch, StoreBuilder, StoreInner, StoreKey, StoreValue};
use crate::config::StoreConfig;
use crate::effect::Effect;
use crate::error::{StoreError, StoreResult};
use crate::memo::{Composite, SnapshotMemo, SnapshotSource};
use crate::registry::{Listener, Subscription};
use crate::select::Selector;

/// A keyed bag of reactive state.
///
/// Each key is independently settable and subscribable, and may be bound
/// to an external synchronizer. Cloning a `Store` creates a new handle to
/// the same state.
///
/// # Examples
///
/// ```
/// use satchel::Store;
/// use std::sync::{Arc, atomic::{AtomicI32, Ordering}};
///
/// let store = Store::builder()
///     .value("count", 0)
///     .value("step", 1)
///     .build()
///     .unwrap();
///
/// let seen = Arc::new(AtomicI32::new(0));
/// let seen_clone = seen.clone();
/// let _sub = store
///     .subscribe(&["count"], move |n| seen_clone.store(*n, Ordering::SeqCst))
///     .unwrap();
///
/// store.set(&"count", 41).unwrap();
/// store.action(&"count").unwrap().update(|n| n + 1);
///
/// assert_eq!(store.get(&"count"), Some(42));
/// assert_eq!(seen.load(Ordering::SeqCst), 42);
/// ```
pub struct Store<K, V> {
    inner: Arc<StoreInner<K, V>>,
}

impl<K: StoreKey, V: StoreValue> Store<K, V> {
    pub fn builder() -> StoreBuilder<K, V> {
        StoreBuilder::new()
    }

    pub(crate) fn from_inner(inner: Arc<StoreInner<K, V>>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<StoreInner<K, V>> {
        Arc::downgrade(&self.inner)
    }

    pub fn config(&self) -> &StoreConfig {
        self.inner.config()
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> Vec<K> {
        self.inner.actions().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.actions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.actions().is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// The action for `key`. Every call returns the same action.
    pub fn action(&self, key: &K) -> Option<Action<K, V>> {
        self.inner.actions().get(key).cloned()
    }

    /// All actions, in declaration order.
    pub fn actions(&self) -> impl Iterator<Item = &Action<K, V>> {
        self.inner.actions().values()
    }

    /// Dispatch to `key` through its action.
    pub fn set(&self, key: &K, dispatch: impl Into<Dispatch<V>>) -> StoreResult<()> {
        let action = self.action(key).ok_or_else(|| StoreError::unknown_key(key))?;
        action.dispatch(dispatch);
        Ok(())
    }

    /// Current value of `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.value(key)
    }

    /// The full current state, freshly built on every call.
    pub fn get_state(&self) -> Composite<K, V> {
        self.inner.full_state()
    }

    pub(crate) fn composite(&self, keys: &[K]) -> Composite<K, V> {
        self.inner.composite(keys)
    }

    fn check_keys(&self, keys: &[K]) -> StoreResult<()> {
        match keys.iter().find(|key| !self.contains_key(key)) {
            Some(key) => Err(StoreError::unknown_key(key)),
            None => Ok(()),
        }
    }

    /// Register `listener` under every key in `keys`.
    ///
    /// The listener receives the new value of whichever key changed.
    pub fn subscribe<F>(&self, keys: &[K], listener: F) -> StoreResult<Subscription>
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        self.check_keys(keys)?;
        Ok(self.subscribe_keys(keys.to_vec(), Arc::new(listener)))
    }

    /// Register a zero-argument `listener` under every key in `keys`.
    pub fn subscribe_notify<F>(&self, keys: &[K], listener: F) -> StoreResult<Subscription>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(keys, move |_: &V| listener())
    }

    pub(crate) fn subscribe_keys(&self, keys: Vec<K>, listener: Listener<V>) -> Subscription {
        self.inner.listeners().subscribe(keys, listener)
    }

    /// Number of listeners registered at `key`, including synchronizer
    /// write-back listeners.
    pub fn listener_count(&self, key: &K) -> usize {
        self.inner.listeners().len(key)
    }

    /// Dispatch the construction value of each key in `keys`, or of every key
    /// when `keys` is empty.
    ///
    /// The construction value of a synchronized key is its fallback.
    pub fn reset(&self, keys: &[K]) -> StoreResult<()> {
        self.check_keys(keys)?;

        let targets = if keys.is_empty() {
            self.keys()
        } else {
            keys.to_vec()
        };
        for key in &targets {
            if let Some(initial) = self.inner.initial().get(key) {
                self.inner.dispatch(key, Dispatch::Value(initial.initial_value()));
            }
        }
        Ok(())
    }

    /// A memoized composite snapshot over `keys`.
    pub fn memo(&self, keys: &[K]) -> StoreResult<SnapshotMemo<K, V>> {
        self.check_keys(keys)?;
        Ok(SnapshotMemo::new(self.clone(), keys.to_vec()))
    }

    /// A subscribe/get-snapshot pair over `keys` for rendering layers.
    pub fn source(&self, keys: &[K]) -> StoreResult<SnapshotSource<K, V>> {
        Ok(SnapshotSource::new(self.memo(keys)?))
    }

    /// A selector that subscribes to keys as they are read.
    ///
    /// `on_change` runs whenever a key the selector has read changes.
    pub fn select<F>(&self, on_change: F) -> Selector<K, V>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Selector::new(self.clone(), Arc::new(on_change))
    }

    /// Run `run` with the full state now and again after every change to any
    /// key in `keys`.
    pub fn effect<F>(&self, run: F, keys: &[K]) -> StoreResult<Effect>
    where
        F: Fn(&Composite<K, V>) + Send + Sync + 'static,
    {
        self.check_keys(keys)?;
        Ok(Effect::new(self, run, keys.to_vec()))
    }

    /// Take every pending synchronizer snapshot and return a future settling
    /// them all. Later calls only see snapshots queued since.
    pub fn initialize(&self) -> BoxFuture<'static, ()> {
        let pending = self.inner.take_pending();
        async move {
            join_all(pending).await;
        }
        .boxed()
    }

    /// Number of snapshots waiting for [`initialize`](Self::initialize).
    pub fn pending_resolutions(&self) -> usize {
        self.inner.pending_len()
    }
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: StoreKey, V: StoreValue + fmt::Debug> fmt::Debug for Store<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.get_state())
            .field("pending", &self.pending_resolutions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_store() -> Store<&'static str, i32> {
        Store::builder()
            .value("count", 0)
            .value("step", 1)
            .build()
            .unwrap()
    }

    #[test]
    fn store_get_set() {
        let store = counter_store();
        assert_eq!(store.get(&"count"), Some(0));

        store.set(&"count", 42).unwrap();
        assert_eq!(store.get_state()[&"count"], 42);
        assert_eq!(store.get_state()[&"step"], 1);
    }

    #[test]
    fn store_functional_update() {
        let store = counter_store();
        store.set(&"count", 10).unwrap();
        store.set(&"count", Dispatch::update(|n| n + 5)).unwrap();
        assert_eq!(store.get(&"count"), Some(15));
    }

    #[test]
    fn listener_sees_updated_state() {
        let store = counter_store();
        let observed = Arc::new(Mutex::new(None));

        let observed_clone = observed.clone();
        let reader = store.clone();
        let _sub = store
            .subscribe(&["count"], move |_| {
                *observed_clone.lock() = reader.get(&"count");
            })
            .unwrap();

        store.set(&"count", 7).unwrap();
        assert_eq!(*observed.lock(), Some(7));
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let store = counter_store();
        let order = Arc::new(Mutex::new(Vec::new()));

        let subs: Vec<_> = (0..3)
            .map(|tag| {
                let order = order.clone();
                store
                    .subscribe(&["count"], move |v| order.lock().push((tag, *v)))
                    .unwrap()
            })
            .collect();

        store.set(&"count", 9).unwrap();
        assert_eq!(*order.lock(), vec![(0, 9), (1, 9), (2, 9)]);
        drop(subs);
    }

    #[test]
    fn unsubscribe_stops_one_listener_only() {
        let store = counter_store();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let first_clone = first.clone();
        let sub_first = store
            .subscribe_notify(&["count"], move || {
                first_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        let second_clone = second.clone();
        let _sub_second = store
            .subscribe_notify(&["count"], move || {
                second_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        store.set(&"count", 1).unwrap();
        sub_first.unsubscribe();
        sub_first.unsubscribe();
        store.set(&"count", 2).unwrap();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listener_may_dispatch_to_another_key() {
        let store = counter_store();
        let step = store.action(&"step").unwrap();
        let _sub = store
            .subscribe(&["count"], move |n| step.set(n * 2))
            .unwrap();

        store.set(&"count", 4).unwrap();
        assert_eq!(store.get(&"step"), Some(8));
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let store: Store<&'static str, u64> = Store::builder().value("n", 0).build().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let action = store.action(&"n").unwrap();
                std::thread::spawn(move || {
                    for _ in 0..5_000 {
                        action.update(|n| n + 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get(&"n"), Some(40_000));
    }

    #[test]
    fn concurrent_writes_notify_in_write_order() {
        let store: Store<&'static str, u64> = Store::builder().value("n", 0).build().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = store
            .subscribe(&["n"], move |n| seen_clone.lock().push(*n))
            .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let action = store.action(&"n").unwrap();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        action.update(|n| n + 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let expected: Vec<u64> = (1..=4_000).collect();
        assert_eq!(*seen.lock(), expected);
    }

    #[test]
    fn nested_dispatch_from_listener_does_not_deadlock() {
        let store = counter_store();
        let count = store.action(&"count").unwrap();
        let _sub = store
            .subscribe(&["step"], move |n| {
                let n = *n;
                count.update(move |c| c + n);
            })
            .unwrap();

        store.set(&"step", 3).unwrap();
        store.set(&"count", Dispatch::update(|c| c * 2)).unwrap();
        assert_eq!(store.get(&"count"), Some(6));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let store = counter_store();
        assert!(matches!(store.set(&"missing", 1), Err(StoreError::UnknownKey(_))));
        assert!(store.subscribe(&["count", "missing"], |_| {}).is_err());
        assert!(store.reset(&["missing"]).is_err());
        assert_eq!(store.listener_count(&"count"), 0);
    }

    #[test]
    fn reset_restores_literals() {
        let store = counter_store();
        store.set(&"count", 5).unwrap();
        store.set(&"step", 3).unwrap();

        store.reset(&["count"]).unwrap();
        assert_eq!(store.get(&"count"), Some(0));
        assert_eq!(store.get(&"step"), Some(3));

        store.reset(&[]).unwrap();
        assert_eq!(store.get(&"step"), Some(1));
    }

    #[test]
    fn reset_notifies_like_a_set() {
        let store = counter_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let _sub = store
            .subscribe_notify(&["count"], move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        store.reset(&["count"]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
