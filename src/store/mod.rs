//! The keyed state container.
//!
//! A [`Store`] owns a fixed, ordered set of keys. Each key has one stable
//! [`Action`] that replaces its value and notifies the key's listeners, and
//! may be bound to an external [`Synchronizer`](crate::sync::Synchronizer).

mod action;
mod builder;
mod init;
mod inner;
mod store;

use std::fmt;
use std::hash::Hash;

pub use action::{Action, Dispatch};
pub use builder::{InitialValue, StoreBuilder};
pub use store::Store;

pub(crate) use inner::StoreInner;

/// Bounds required of a store key.
pub trait StoreKey: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> StoreKey for T where T: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

/// Bounds required of a store value. `PartialEq` is the deep equality used
/// to memoize snapshots.
pub trait StoreValue: Clone + PartialEq + Send + Sync + 'static {}

impl<T> StoreValue for T where T: Clone + PartialEq + Send + Sync + 'static {}
