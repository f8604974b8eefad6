//! Side effects keyed on store changes.

mod effect;

pub use effect::Effect;
