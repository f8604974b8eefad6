//! Store configuration.

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// How a pending synchronizer snapshot is applied once it resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Always write the resolved value, even if the key was dispatched to
    /// after it was seeded with the fallback.
    #[default]
    Always,
    /// Drop the resolved value if any dispatch touched the key after seeding.
    SkipIfChanged,
}

/// Store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Resolution policy for pending snapshots
    pub resolution: ResolutionPolicy,

    /// Reconcile the synchronizer to its fallback when a pending snapshot fails
    pub reconcile_on_rejection: bool,

    /// Spawn pending snapshots on the ambient Tokio runtime at build time
    pub spawn_pending: bool,
}

impl StoreConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_resolution(mut self, resolution: ResolutionPolicy) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_reconcile_on_rejection(mut self, reconcile: bool) -> Self {
        self.reconcile_on_rejection = reconcile;
        self
    }

    pub fn with_spawn_pending(mut self, spawn: bool) -> Self {
        self.spawn_pending = spawn;
        self
    }
}
