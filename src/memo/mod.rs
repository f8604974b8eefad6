//! Composite snapshots and equality-based memoization.
//!
//! Rendering layers compare snapshots by identity. A [`SnapshotMemo`] hands
//! back the previous `Arc` whenever a recomputed [`Composite`] is deep-equal
//! to it, so unrelated mutations never look like changes.

mod composite;
mod memo;
mod source;

pub use composite::Composite;
pub use memo::SnapshotMemo;
pub use source::{ExternalStore, SnapshotSource};
