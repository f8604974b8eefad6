use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Store, StoreInner, StoreKey, StoreValue};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::sync::Synchronizer;

type Validator<K, V> = Box<dyn Fn(&K, &V) -> Result<(), String>>;

/// How a key gets its value at construction.
pub enum InitialValue<K, V> {
    /// A literal value.
    Value(V),
    /// A value owned by an external system.
    Synced(Arc<dyn Synchronizer<K, V>>),
}

impl<K, V: Clone> InitialValue<K, V> {
    /// The value `reset` restores: the literal, or the synchronizer fallback.
    pub fn initial_value(&self) -> V {
        match self {
            InitialValue::Value(value) => value.clone(),
            InitialValue::Synced(synchronizer) => synchronizer.fallback(),
        }
    }

    pub fn synchronizer(&self) -> Option<&Arc<dyn Synchronizer<K, V>>> {
        match self {
            InitialValue::Value(_) => None,
            InitialValue::Synced(synchronizer) => Some(synchronizer),
        }
    }
}

impl<K, V: Clone> Clone for InitialValue<K, V> {
    fn clone(&self) -> Self {
        match self {
            InitialValue::Value(value) => InitialValue::Value(value.clone()),
            InitialValue::Synced(synchronizer) => InitialValue::Synced(Arc::clone(synchronizer)),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for InitialValue<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            InitialValue::Synced(_) => f.write_str("Synced(..)"),
        }
    }
}

/// Collects the fixed key set of a [`Store`].
///
/// # Examples
///
/// ```
/// use satchel::Store;
///
/// let store = Store::builder()
///     .value("count", 0)
///     .value("step", 1)
///     .build()
///     .unwrap();
///
/// assert_eq!(store.get(&"count"), Some(0));
/// ```
pub struct StoreBuilder<K, V> {
    entries: Vec<(K, InitialValue<K, V>)>,
    validators: Vec<Validator<K, V>>,
    config: StoreConfig,
}

impl<K: StoreKey, V: StoreValue> StoreBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            validators: Vec::new(),
            config: StoreConfig::default(),
        }
    }

    /// Declare a key holding a literal value.
    pub fn value(self, key: K, value: V) -> Self {
        self.entry(key, InitialValue::Value(value))
    }

    /// Declare a key bound to a synchronizer.
    pub fn synced<S>(self, key: K, synchronizer: S) -> Self
    where
        S: Synchronizer<K, V> + 'static,
    {
        self.entry(key, InitialValue::Synced(Arc::new(synchronizer)))
    }

    pub fn entry(mut self, key: K, initial: InitialValue<K, V>) -> Self {
        self.entries.push((key, initial));
        self
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Reject initial values at build time.
    ///
    /// The check sees every literal value and every synchronizer fallback
    /// before any synchronizer is contacted.
    pub fn validate_with<F>(mut self, validator: F) -> Self
    where
        F: Fn(&K, &V) -> Result<(), String> + 'static,
    {
        self.validators.push(Box::new(validator));
        self
    }

    /// Build the store and run the synchronizer protocol for every bound key.
    pub fn build(self) -> StoreResult<Store<K, V>> {
        let mut initial = IndexMap::with_capacity(self.entries.len());
        for (key, entry) in self.entries {
            if initial.contains_key(&key) {
                return Err(StoreError::DuplicateKey(format!("{key:?}")));
            }
            initial.insert(key, entry);
        }

        for (key, entry) in &initial {
            let value = entry.initial_value();
            for validator in &self.validators {
                validator(key, &value).map_err(|reason| StoreError::InvalidValue {
                    key: format!("{key:?}"),
                    reason,
                })?;
            }
        }

        let synced: Vec<_> = initial
            .iter()
            .filter_map(|(key, entry)| entry.synchronizer().map(|s| (key.clone(), Arc::clone(s))))
            .collect();

        let inner = StoreInner::new(initial, self.config);
        for (key, synchronizer) in &synced {
            inner.attach(key, synchronizer);
        }

        let store = Store::from_inner(inner);
        debug!(
            keys = store.len(),
            synchronized = synced.len(),
            pending = store.pending_resolutions(),
            "store constructed"
        );

        if store.config().spawn_pending && store.pending_resolutions() > 0 {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(store.initialize());
                }
                Err(_) => warn!("spawn_pending is set but no Tokio runtime is running"),
            }
        }

        Ok(store)
    }
}

impl<K: StoreKey, V: StoreValue> Default for StoreBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_fail() {
        let result = Store::builder().value("a", 1).value("a", 2).build();
        assert!(matches!(result, Err(StoreError::DuplicateKey(_))));
    }

    #[test]
    fn validator_rejects_before_construction() {
        let result = Store::builder()
            .value("a", 1)
            .value("b", -1)
            .validate_with(|_, v: &i32| {
                if *v < 0 {
                    Err("negative".to_string())
                } else {
                    Ok(())
                }
            })
            .build();

        match result {
            Err(StoreError::InvalidValue { key, reason }) => {
                assert_eq!(key, "\"b\"");
                assert_eq!(reason, "negative");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn keys_keep_declaration_order() {
        let store = Store::builder()
            .value("z", 1)
            .value("a", 2)
            .value("m", 3)
            .build()
            .unwrap();
        assert_eq!(store.keys(), vec!["z", "a", "m"]);
    }
}
