use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use super::{Dispatch, StoreInner, StoreKey, StoreValue};
use crate::config::ResolutionPolicy;
use crate::error::SyncError;
use crate::sync::{SnapshotFuture, Synchronizer};

/// Settle one pending snapshot for `key`.
///
/// A present value is dispatched through the key's action. An absent value
/// reconciles the synchronizer to its fallback. A failure leaves the fallback
/// in place and only reconciles when the store is configured to.
pub(crate) async fn resolve<K: StoreKey, V: StoreValue>(
    store: Weak<StoreInner<K, V>>,
    key: K,
    synchronizer: Arc<dyn Synchronizer<K, V>>,
    snapshot: SnapshotFuture<V>,
    seeded_at: u64,
) {
    let outcome = snapshot.await;

    let Some(store) = store.upgrade() else {
        debug!(key = ?key, "store dropped before snapshot resolved");
        return;
    };

    settle(&store, &key, synchronizer.as_ref(), outcome, seeded_at);
}

/// Apply a settled snapshot. The generation check and the dispatch it
/// guards run under one dispatch guard.
fn settle<K: StoreKey, V: StoreValue>(
    store: &StoreInner<K, V>,
    key: &K,
    synchronizer: &dyn Synchronizer<K, V>,
    outcome: Result<Option<V>, SyncError>,
    seeded_at: u64,
) {
    let _guard = store.dispatch_guard();

    if store.config().resolution == ResolutionPolicy::SkipIfChanged
        && store.generation(key) != Some(seeded_at)
    {
        debug!(key = ?key, "key changed while snapshot was pending, resolution dropped");
        return;
    }

    match outcome {
        Ok(Some(value)) => {
            debug!(key = ?key, "pending snapshot resolved");
            store.dispatch(key, Dispatch::Value(value));
        }
        Ok(None) => {
            debug!(key = ?key, "pending snapshot absent, reconciling to fallback");
            synchronizer.update(&synchronizer.fallback(), key);
        }
        Err(err) => {
            warn!(key = ?key, error = %err, "pending snapshot failed, keeping fallback");
            if store.config().reconcile_on_rejection {
                synchronizer.update(&synchronizer.fallback(), key);
            }
        }
    }
}
