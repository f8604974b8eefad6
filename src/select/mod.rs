//! Selective subscription.
//!
//! A [`Selector`] discovers which keys a consumer uses by recording the keys
//! it reads, and only ever subscribes to those.

mod selector;

pub use selector::Selector;
