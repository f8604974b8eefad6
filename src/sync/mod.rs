//! External synchronization backends.
//!
//! A [`Synchronizer`] gives one store key an outside source of truth. The
//! store reads its snapshot at construction, writes every change back, and
//! accepts pushes through the key's action.

mod file;
mod memory;
mod synchronizer;

pub use file::JsonFileSynchronizer;
pub use memory::{MemoryStorage, MemorySynchronizer};
pub use synchronizer::{Snapshot, SnapshotFuture, Synchronizer};
