use parking_lot::Mutex;
use std::sync::Arc;

use super::Composite;
use crate::store::{Store, StoreKey, StoreValue};

/// A memoized composite snapshot over a fixed key list.
///
/// Each call to [`get`](Self::get) rebuilds the composite from current store
/// values and returns the previously returned `Arc` when nothing differs.
/// The memo is per instance: two memos over the same keys never share state.
pub struct SnapshotMemo<K, V> {
    store: Store<K, V>,
    keys: Vec<K>,
    last: Mutex<Option<Arc<Composite<K, V>>>>,
}

impl<K: StoreKey, V: StoreValue> SnapshotMemo<K, V> {
    pub(crate) fn new(store: Store<K, V>, keys: Vec<K>) -> Self {
        Self {
            store,
            keys,
            last: Mutex::new(None),
        }
    }

    /// The keys this memo snapshots, in order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn store(&self) -> &Store<K, V> {
        &self.store
    }

    /// Get the current composite, reusing the previous one if it is equal.
    pub fn get(&self) -> Arc<Composite<K, V>> {
        let next = self.store.composite(&self.keys);

        let mut last = self.last.lock();
        if let Some(previous) = last.as_ref() {
            if **previous == next {
                return Arc::clone(previous);
            }
        }

        let next = Arc::new(next);
        *last = Some(Arc::clone(&next));
        next
    }
}

#[cfg(test)]
mod tests {
    use crate::Store;
    use std::sync::Arc;

    fn store() -> Store<&'static str, Vec<u8>> {
        Store::builder()
            .value("a", vec![1])
            .value("b", vec![2])
            .value("c", vec![3])
            .build()
            .unwrap()
    }

    #[test]
    fn unchanged_keys_return_same_instance() {
        let store = store();
        let memo = store.memo(&["a", "b"]).unwrap();

        let first = memo.get();
        store.set(&"c", vec![9]).unwrap();
        let second = memo.get();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn changed_key_returns_new_instance() {
        let store = store();
        let memo = store.memo(&["a", "b"]).unwrap();

        let first = memo.get();
        store.set(&"a", vec![4]).unwrap();
        let second = memo.get();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second[&"a"], vec![4]);
    }

    #[test]
    fn deep_equal_rewrite_keeps_instance() {
        let store = store();
        let memo = store.memo(&["a"]).unwrap();

        let first = memo.get();
        store.set(&"a", vec![1]).unwrap();
        assert!(Arc::ptr_eq(&first, &memo.get()));
    }

    #[test]
    fn memos_are_independent() {
        let store = store();
        let left = store.memo(&["a"]).unwrap();
        let right = store.memo(&["a"]).unwrap();

        assert!(!Arc::ptr_eq(&left.get(), &right.get()));
    }
}
