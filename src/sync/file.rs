use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::{Snapshot, Synchronizer};
use crate::error::SyncError;
use crate::store::{StoreKey, StoreValue};

/// Persists each key as `<dir>/<key>.json`.
///
/// A key's `Display` form must be a plain file stem. Keys that are empty,
/// `.` or `..`, or that contain a path separator are rejected, so the
/// store falls back and nothing is read or written for them.
///
/// Snapshots are read asynchronously with `tokio::fs`, so they must be driven
/// inside a Tokio runtime. A missing file resolves as absent, which makes the
/// store write the fallback to disk. Writes are synchronous.
#[derive(Debug, Clone)]
pub struct JsonFileSynchronizer<V> {
    dir: PathBuf,
    fallback: V,
}

impl<V> JsonFileSynchronizer<V> {
    pub fn new(dir: impl Into<PathBuf>, fallback: V) -> Self {
        Self {
            dir: dir.into(),
            fallback,
        }
    }

    pub fn path_for(&self, key: &impl Display) -> Result<PathBuf, SyncError> {
        let stem = key.to_string();
        if stem.is_empty()
            || stem == "."
            || stem == ".."
            || stem.contains(['/', '\\'])
        {
            return Err(SyncError::InvalidKey(stem));
        }
        Ok(self.dir.join(format!("{stem}.json")))
    }
}

async fn read_json<V: DeserializeOwned>(path: PathBuf) -> Result<Option<V>, SyncError> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn write_json<V: Serialize>(path: &Path, value: &V) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

impl<K, V> Synchronizer<K, V> for JsonFileSynchronizer<V>
where
    K: StoreKey + Display,
    V: StoreValue + Serialize + DeserializeOwned,
{
    fn fallback(&self) -> V {
        self.fallback.clone()
    }

    fn get_snapshot(&self, key: &K) -> Result<Snapshot<V>, SyncError> {
        Ok(Snapshot::pending(read_json(self.path_for(key)?)))
    }

    fn update(&self, value: &V, key: &K) {
        let path = match self.path_for(key) {
            Ok(path) => path,
            Err(err) => {
                warn!(key = %key, error = %err, "value not persisted");
                return;
            }
        };
        if let Err(err) = write_json(&path, value) {
            warn!(path = %path.display(), error = %err, "failed to persist value");
        }
    }
}
