use std::fmt;
use std::sync::Arc;

use crate::memo::Composite;
use crate::registry::{Listener, Subscription};
use crate::store::{Store, StoreKey, StoreValue};

/// A side effect that runs when any of its declared keys change.
///
/// The effect runs immediately on creation. It always receives the entire
/// current state; the declared keys only decide when it reruns. Dropping the
/// effect disposes it.
///
/// # Examples
///
/// ```
/// use satchel::Store;
/// use std::sync::{Arc, atomic::{AtomicI32, Ordering}};
///
/// let store = Store::builder().value("a", 1).value("b", 2).build().unwrap();
/// let sum = Arc::new(AtomicI32::new(0));
/// let sum_clone = sum.clone();
///
/// let _effect = store
///     .effect(
///         move |state| sum_clone.store(state.values().sum(), Ordering::SeqCst),
///         &["a"],
///     )
///     .unwrap();
///
/// // Effect runs immediately
/// assert_eq!(sum.load(Ordering::SeqCst), 3);
///
/// store.set(&"a", 10).unwrap();
/// assert_eq!(sum.load(Ordering::SeqCst), 12);
/// ```
#[must_use = "dropping an Effect disposes it"]
pub struct Effect {
    subscription: Subscription,
}

impl Effect {
    pub(crate) fn new<K, V, F>(store: &Store<K, V>, run: F, keys: Vec<K>) -> Self
    where
        K: StoreKey,
        V: StoreValue,
        F: Fn(&Composite<K, V>) + Send + Sync + 'static,
    {
        run(&store.get_state());

        let weak = store.downgrade();
        let rerun: Listener<V> = Arc::new(move |_: &V| {
            if let Some(inner) = weak.upgrade() {
                run(&inner.full_state());
            }
        });
        let subscription = store.subscribe_keys(keys, rerun);

        Self { subscription }
    }

    /// Stop rerunning. Later calls do nothing.
    pub fn dispose(&self) {
        self.subscription.unsubscribe();
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    /// Keep the effect running for the lifetime of the store.
    pub fn detach(self) {
        self.subscription.detach();
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("active", &self.is_active())
            .finish()
    }
}
