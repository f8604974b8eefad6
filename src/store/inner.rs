use futures::future::BoxFuture;
use indexmap::IndexMap;
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

use super::{Action, Dispatch, InitialValue, StoreKey, StoreValue};
use crate::config::StoreConfig;
use crate::memo::Composite;
use crate::registry::{Listener, ListenerRegistry};
use crate::sync::{Snapshot, Synchronizer};

/// Current value of a key plus the number of dispatches it has seen.
struct Slot<V> {
    value: V,
    generation: u64,
}

/// Shared state behind every [`Store`](super::Store) handle.
pub(crate) struct StoreInner<K, V> {
    state: RwLock<IndexMap<K, Slot<V>>>,
    listeners: Arc<ListenerRegistry<K, V>>,
    actions: IndexMap<K, Action<K, V>>,
    initial: IndexMap<K, InitialValue<K, V>>,
    pending: Mutex<Vec<BoxFuture<'static, ()>>>,
    /// Serializes dispatches. Reentrant so listeners and updaters on the
    /// dispatching thread may dispatch again.
    dispatching: ReentrantMutex<()>,
    config: StoreConfig,
}

impl<K: StoreKey, V: StoreValue> StoreInner<K, V> {
    /// Allocate the container with every key holding its construction value.
    ///
    /// Synchronized keys start at their fallback until [`attach`](Self::attach)
    /// resolves their snapshot.
    pub(crate) fn new(
        initial: IndexMap<K, InitialValue<K, V>>,
        config: StoreConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let mut state = IndexMap::with_capacity(initial.len());
            let mut actions = IndexMap::with_capacity(initial.len());
            for (key, entry) in &initial {
                state.insert(
                    key.clone(),
                    Slot {
                        value: entry.initial_value(),
                        generation: 0,
                    },
                );
                actions.insert(key.clone(), Action::new(key.clone(), weak.clone()));
            }

            Self {
                state: RwLock::new(state),
                listeners: Arc::new(ListenerRegistry::new(initial.keys())),
                actions,
                initial,
                pending: Mutex::new(Vec::new()),
                dispatching: ReentrantMutex::new(()),
                config,
            }
        })
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn listeners(&self) -> &Arc<ListenerRegistry<K, V>> {
        &self.listeners
    }

    pub(crate) fn actions(&self) -> &IndexMap<K, Action<K, V>> {
        &self.actions
    }

    pub(crate) fn initial(&self) -> &IndexMap<K, InitialValue<K, V>> {
        &self.initial
    }

    pub(crate) fn contains_key(&self, key: &K) -> bool {
        self.actions.contains_key(key)
    }

    pub(crate) fn value(&self, key: &K) -> Option<V> {
        self.state.read().get(key).map(|slot| slot.value.clone())
    }

    pub(crate) fn generation(&self, key: &K) -> Option<u64> {
        self.state.read().get(key).map(|slot| slot.generation)
    }

    /// Values of `keys`, in the order given, read under one lock.
    pub(crate) fn composite(&self, keys: &[K]) -> Composite<K, V> {
        let state = self.state.read();
        keys.iter()
            .filter_map(|key| state.get(key).map(|slot| (key.clone(), slot.value.clone())))
            .collect()
    }

    pub(crate) fn full_state(&self) -> Composite<K, V> {
        self.state
            .read()
            .iter()
            .map(|(key, slot)| (key.clone(), slot.value.clone()))
            .collect()
    }

    /// Replace the value at `key`, then notify the key's listeners.
    ///
    /// The read, update, write and fan-out of one dispatch run under the
    /// dispatch guard, so concurrent dispatches never interleave. The state
    /// and listener locks are not held while the updater or a listener runs.
    pub(crate) fn dispatch(&self, key: &K, dispatch: Dispatch<V>) {
        let _guard = self.dispatch_guard();
        let value = match dispatch {
            Dispatch::Value(value) => value,
            Dispatch::Update(f) => {
                let Some(current) = self.value(key) else {
                    warn!(key = ?key, "dispatch to unknown key ignored");
                    return;
                };
                f(&current)
            }
        };

        {
            let mut state = self.state.write();
            let Some(slot) = state.get_mut(key) else {
                warn!(key = ?key, "dispatch to unknown key ignored");
                return;
            };
            slot.value = value.clone();
            slot.generation += 1;
            trace!(key = ?key, generation = slot.generation, "dispatch");
        }

        for listener in self.listeners.listeners(key) {
            listener(&value);
        }
    }

    /// Hold off every other thread's dispatch until the guard is dropped.
    pub(crate) fn dispatch_guard(&self) -> ReentrantMutexGuard<'_, ()> {
        self.dispatching.lock()
    }

    /// Write a construction value without notifying anyone. Returns the
    /// key's generation at the time of seeding.
    fn seed(&self, key: &K, value: V) -> u64 {
        let mut state = self.state.write();
        match state.get_mut(key) {
            Some(slot) => {
                slot.value = value;
                slot.generation
            }
            None => 0,
        }
    }

    /// Bind `synchronizer` to `key`: accept its pushes, write every change
    /// back to it, and seed the key from its snapshot.
    pub(crate) fn attach(self: &Arc<Self>, key: &K, synchronizer: &Arc<dyn Synchronizer<K, V>>) {
        if let Some(action) = self.actions.get(key) {
            synchronizer.subscribe(action.clone(), key);
        }

        let writer = Arc::clone(synchronizer);
        let write_key = key.clone();
        let write_back: Listener<V> = Arc::new(move |value: &V| writer.update(value, &write_key));
        self.listeners.add(std::slice::from_ref(key), &write_back);

        match synchronizer.get_snapshot(key) {
            Ok(Snapshot::Ready(value)) => {
                self.seed(key, value);
                debug!(key = ?key, "seeded from synchronizer snapshot");
            }
            Ok(Snapshot::Pending(snapshot)) => {
                let seeded_at = self.seed(key, synchronizer.fallback());
                let resolution = super::init::resolve(
                    Arc::downgrade(self),
                    key.clone(),
                    Arc::clone(synchronizer),
                    snapshot,
                    seeded_at,
                );
                self.pending.lock().push(Box::pin(resolution));
                debug!(key = ?key, "seeded from fallback, snapshot pending");
            }
            Err(err) => {
                warn!(key = ?key, error = %err, "synchronizer snapshot failed, using fallback");
                let fallback = synchronizer.fallback();
                self.seed(key, fallback.clone());
                synchronizer.update(&fallback, key);
            }
        }
    }

    pub(crate) fn take_pending(&self) -> Vec<BoxFuture<'static, ()>> {
        std::mem::take(&mut *self.pending.lock())
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}
