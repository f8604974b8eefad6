//! Per-key listener registry.
//!
//! This module provides the notification primitive every other part of the
//! store is built on: ordered listener lists per key, and RAII subscription
//! handles that remove a listener from exactly the keys it was added to.

mod listeners;
mod subscription;

pub use listeners::{Listener, ListenerRegistry};
pub use subscription::Subscription;
