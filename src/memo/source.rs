use std::sync::Arc;

use super::{Composite, SnapshotMemo};
use crate::registry::Subscription;
use crate::store::{StoreKey, StoreValue};

/// The read/subscribe contract a rendering layer drives re-renders from.
///
/// `subscribe` takes a zero-argument listener and returns the guard that
/// removes it; `get_snapshot` returns a value whose identity changes only
/// when its content does.
pub trait ExternalStore {
    type Snapshot;

    fn subscribe(&self, listener: Arc<dyn Fn() + Send + Sync>) -> Subscription;

    fn get_snapshot(&self) -> Self::Snapshot;
}

/// A memoized snapshot over a fixed key list, paired with subscription to
/// the same keys.
pub struct SnapshotSource<K, V> {
    memo: SnapshotMemo<K, V>,
}

impl<K: StoreKey, V: StoreValue> SnapshotSource<K, V> {
    pub(crate) fn new(memo: SnapshotMemo<K, V>) -> Self {
        Self { memo }
    }

    pub fn keys(&self) -> &[K] {
        self.memo.keys()
    }
}

impl<K: StoreKey, V: StoreValue> ExternalStore for SnapshotSource<K, V> {
    type Snapshot = Arc<Composite<K, V>>;

    fn subscribe(&self, listener: Arc<dyn Fn() + Send + Sync>) -> Subscription {
        self.memo
            .store()
            .subscribe_keys(self.memo.keys().to_vec(), Arc::new(move |_: &V| listener()))
    }

    fn get_snapshot(&self) -> Self::Snapshot {
        self.memo.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn source_notifies_only_for_its_keys() {
        let store = Store::builder()
            .value("a", 1)
            .value("b", 2)
            .build()
            .unwrap();
        let source = store.source(&["a"]).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let _sub = source.subscribe(Arc::new(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let before = source.get_snapshot();
        store.set(&"b", 3).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(Arc::ptr_eq(&before, &source.get_snapshot()));

        store.set(&"a", 5).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.get_snapshot()[&"a"], 5);
    }
}
