use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::memo::{Composite, SnapshotMemo};
use crate::registry::Subscription;
use crate::store::{Action, Store, StoreKey, StoreValue};

type Notify = Arc<dyn Fn() + Send + Sync>;

/// The keys a selector has read and the subscription covering them.
struct Binding<K, V> {
    tracked: Vec<K>,
    memo: Option<SnapshotMemo<K, V>>,
    subscription: Subscription,
    cycles: u64,
}

/// A per-consumer view of a store that subscribes lazily.
///
/// Reading a key through [`get`](Self::get) for the first time adds it to
/// the tracked set and rebinds: a fresh memo and a fresh subscription over
/// all tracked keys replace the old ones. Keys that are never read are never
/// subscribed, so changes to them never reach `on_change`.
///
/// Until a key is read, [`snapshot`](Self::snapshot) is the full, unmemoized
/// state and nothing is subscribed.
///
/// # Examples
///
/// ```
/// use satchel::Store;
/// use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
///
/// let store = Store::builder().value("a", 1).value("b", 2).build().unwrap();
///
/// let renders = Arc::new(AtomicUsize::new(0));
/// let renders_clone = renders.clone();
/// let selector = store.select(move || {
///     renders_clone.fetch_add(1, Ordering::SeqCst);
/// });
///
/// assert_eq!(selector.get(&"a"), Some(1));
///
/// store.set(&"b", 20).unwrap();
/// assert_eq!(renders.load(Ordering::SeqCst), 0);
///
/// store.set(&"a", 10).unwrap();
/// assert_eq!(renders.load(Ordering::SeqCst), 1);
/// ```
pub struct Selector<K, V> {
    store: Store<K, V>,
    on_change: Notify,
    binding: Mutex<Binding<K, V>>,
}

impl<K: StoreKey, V: StoreValue> Selector<K, V> {
    pub(crate) fn new(store: Store<K, V>, on_change: Notify) -> Self {
        Self {
            store,
            on_change,
            binding: Mutex::new(Binding {
                tracked: Vec::new(),
                memo: None,
                subscription: Subscription::empty(),
                cycles: 0,
            }),
        }
    }

    /// Read `key`, subscribing to it on first use.
    ///
    /// Returns `None` for keys outside the store; those are never tracked.
    pub fn get(&self, key: &K) -> Option<V> {
        if !self.store.contains_key(key) {
            return None;
        }
        self.track(key);
        self.store.get(key)
    }

    fn track(&self, key: &K) {
        let mut binding = self.binding.lock();
        if binding.tracked.contains(key) {
            return;
        }

        binding.tracked.push(key.clone());
        let keys = binding.tracked.clone();

        let on_change = Arc::clone(&self.on_change);
        let subscription = self
            .store
            .subscribe_keys(keys.clone(), Arc::new(move |_: &V| on_change()));
        let previous = std::mem::replace(&mut binding.subscription, subscription);
        binding.memo = Some(SnapshotMemo::new(self.store.clone(), keys));
        binding.cycles += 1;
        let cycles = binding.cycles;
        drop(binding);

        previous.unsubscribe();
        debug!(key = ?key, cycles, "selector tracking key");
    }

    /// The current view: the memoized composite of tracked keys, or the full
    /// state when nothing has been read yet.
    pub fn snapshot(&self) -> Arc<Composite<K, V>> {
        let binding = self.binding.lock();
        match &binding.memo {
            Some(memo) => memo.get(),
            None => Arc::new(self.store.get_state()),
        }
    }

    /// The store's action for `key`. Does not track the key.
    pub fn action(&self, key: &K) -> Option<Action<K, V>> {
        self.store.action(key)
    }

    /// Keys read so far, in first-read order.
    pub fn tracked_keys(&self) -> Vec<K> {
        self.binding.lock().tracked.clone()
    }

    /// Number of rebinds run so far.
    pub fn cycles(&self) -> u64 {
        self.binding.lock().cycles
    }

    pub fn is_subscribed(&self) -> bool {
        self.binding.lock().subscription.is_active()
    }
}
