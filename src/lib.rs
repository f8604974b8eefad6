//! # Satchel
//!
//! A keyed reactive state container.
//!
//! A [`Store`] holds a fixed set of keys. Each key is independently mutable
//! through its [`Action`], independently subscribable, and optionally bound
//! to an external [`Synchronizer`] that supplies its initial value and
//! receives every change.
//!
//! ## Building blocks
//!
//! - [`Store`] - the state container and action dispatcher
//! - [`Subscription`] - RAII guard for a per-key listener
//! - [`SnapshotMemo`] / [`SnapshotSource`] - equality-memoized composite
//!   snapshots for identity-based change detection
//! - [`Selector`] - a consumer view that subscribes to keys as they are read
//! - [`Effect`] - a callback rerun whenever declared keys change
//! - [`Synchronizer`] - the external backend contract, with
//!   [`MemoryStorage`] and [`JsonFileSynchronizer`] implementations
//!
//! ## Example
//!
//! ```
//! use satchel::{MemoryStorage, Store};
//!
//! let storage = MemoryStorage::new();
//! storage.insert("theme", "dark".to_string());
//!
//! let store = Store::builder()
//!     .value("user", "guest".to_string())
//!     .synced("theme", storage.synchronizer("light".to_string()))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.get(&"theme").as_deref(), Some("dark"));
//!
//! store.set(&"theme", "solarized".to_string()).unwrap();
//! assert_eq!(storage.get(&"theme").as_deref(), Some("solarized"));
//!
//! store.reset(&["theme"]).unwrap();
//! assert_eq!(store.get(&"theme").as_deref(), Some("light"));
//! ```

pub mod config;
pub mod effect;
pub mod error;
pub mod memo;
pub mod registry;
pub mod select;
pub mod store;
pub mod sync;

// Re-export main types for convenience
pub use config::{ResolutionPolicy, StoreConfig};
pub use effect::Effect;
pub use error::{StoreError, StoreResult, SyncError};
pub use memo::{Composite, ExternalStore, SnapshotMemo, SnapshotSource};
pub use registry::{Listener, Subscription};
pub use select::Selector;
pub use store::{Action, Dispatch, InitialValue, Store, StoreBuilder, StoreKey, StoreValue};
pub use sync::{
    JsonFileSynchronizer, MemoryStorage, MemorySynchronizer, Snapshot, SnapshotFuture,
    Synchronizer,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = Store::builder().value("count", 0).build().unwrap();
        assert_eq!(store.get(&"count"), Some(0));
        store.set(&"count", 42).unwrap();
        assert_eq!(store.get(&"count"), Some(42));
    }
}
