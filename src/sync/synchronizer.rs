use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;

use crate::error::SyncError;
use crate::store::Action;

/// A snapshot that settles later. `Ok(None)` means the external system holds
/// no value for the key.
pub type SnapshotFuture<V> = BoxFuture<'static, Result<Option<V>, SyncError>>;

/// The result of reading a key from a synchronizer.
pub enum Snapshot<V> {
    /// Available now.
    Ready(V),
    /// Available once the future settles.
    Pending(SnapshotFuture<V>),
}

impl<V> Snapshot<V> {
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Option<V>, SyncError>> + Send + 'static,
    {
        Snapshot::Pending(future.boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Snapshot::Pending(_))
    }
}

impl<V: fmt::Debug> fmt::Debug for Snapshot<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snapshot::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Snapshot::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// An external source of truth for one store key.
///
/// At construction the store, in order: hands [`subscribe`](Self::subscribe)
/// the key's action, registers a listener calling [`update`](Self::update)
/// on every change, and seeds the key from [`get_snapshot`](Self::get_snapshot).
///
/// - `Ok(Ready(v))` seeds `v`.
/// - `Ok(Pending(f))` seeds [`fallback`](Self::fallback); when `f` yields a
///   value it is dispatched through the action, when it yields nothing the
///   synchronizer is told to adopt the fallback, and when it fails the
///   fallback stays.
/// - `Err(_)` seeds the fallback and tells the synchronizer to adopt it.
pub trait Synchronizer<K, V>: Send + Sync {
    /// The value used when no external snapshot is available.
    fn fallback(&self) -> V;

    fn get_snapshot(&self, key: &K) -> Result<Snapshot<V>, SyncError>;

    /// Write `value` to the external system.
    fn update(&self, value: &V, key: &K);

    /// Receive the store's action for `key` so external changes can be
    /// pushed into the store.
    fn subscribe(&self, setter: Action<K, V>, key: &K) {
        let _ = (setter, key);
    }
}
