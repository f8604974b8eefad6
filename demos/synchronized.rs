//! Keys backed by external storage
//!
//! Run with `RUST_LOG=satchel=debug` to watch the synchronizer protocol.

use satchel::{JsonFileSynchronizer, MemoryStorage, ResolutionPolicy, Store, StoreConfig};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Synchronized Store Example ===\n");

    let dir: PathBuf = std::env::temp_dir().join("satchel-demo");
    let storage = MemoryStorage::new();
    storage.insert("session", "restored-session".to_string());

    // 1. Build a store with one file-backed key and one memory-backed key
    println!("1. Building store");
    let store = Store::builder()
        .synced("theme", JsonFileSynchronizer::new(&dir, "light".to_string()))
        .synced("session", storage.synchronizer("anonymous".to_string()))
        .value("draft", String::new())
        .config(StoreConfig::default().with_resolution(ResolutionPolicy::SkipIfChanged))
        .build()
        .expect("keys are unique");

    // The file read is pending, so the theme starts at its fallback
    println!("   theme   = {:?}", store.get(&"theme"));
    println!("   session = {:?}", store.get(&"session"));
    println!("   pending = {}", store.pending_resolutions());

    // 2. Drive pending snapshots
    println!("\n2. Resolving pending snapshots");
    store.initialize().await;
    println!("   theme   = {:?}", store.get(&"theme"));

    // 3. Writes go back to their backends
    println!("\n3. Writing through");
    store.set(&"theme", "dark".to_string()).expect("theme is a store key");
    store
        .set(&"session", "user-42".to_string())
        .expect("session is a store key");
    println!("   {} now holds {:?}", dir.join("theme.json").display(), "dark");
    println!("   storage session = {:?}", storage.get(&"session"));

    // 4. External changes are pushed into the store
    println!("\n4. Publishing an external change");
    storage.publish(&"session", "user-7".to_string());
    println!("   session = {:?}", store.get(&"session"));

    // 5. Reset uses the fallback values
    println!("\n5. Reset");
    store.reset(&[]).expect("reset all keys");
    println!("   state = {:?}", store.get_state());
}
