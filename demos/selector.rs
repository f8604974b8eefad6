//! Demonstration of lazy, read-driven subscriptions

use satchel::Store;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

fn main() {
    println!("=== Selector Example ===\n");

    let store = Store::builder()
        .value("first_name", "John".to_string())
        .value("last_name", "Doe".to_string())
        .value("nickname", "JD".to_string())
        .build()
        .expect("keys are unique");

    let renders = Arc::new(AtomicUsize::new(0));
    let renders_clone = renders.clone();
    let view = store.select(move || {
        let n = renders_clone.fetch_add(1, Ordering::SeqCst) + 1;
        println!("   [Render] re-render #{n}");
    });

    // 1. Nothing read yet: the view sees everything and subscribes to nothing
    println!("1. Snapshot before any read: {} keys", view.snapshot().len());

    // 2. Reading keys subscribes to them
    println!("\n2. Reading first and last name");
    println!(
        "   Full name: {} {}",
        view.get(&"first_name").unwrap_or_default(),
        view.get(&"last_name").unwrap_or_default()
    );
    println!("   Tracked keys: {:?}", view.tracked_keys());

    // 3. Unread keys never trigger renders
    println!("\n3. Changing nickname (never read)");
    store
        .set(&"nickname", "Johnny".to_string())
        .expect("nickname is a store key");

    // 4. Read keys do
    println!("\n4. Changing first name");
    store
        .set(&"first_name", "Jane".to_string())
        .expect("first_name is a store key");

    println!("\nTotal renders: {}", renders.load(Ordering::SeqCst));

    // 5. Effects see the whole state but rerun only for their keys
    println!("\n5. Effect on last name");
    let _effect = store
        .effect(
            |state| println!("   [Effect] state has {} keys", state.len()),
            &["last_name"],
        )
        .expect("last_name is a store key");
    store
        .set(&"last_name", "Smith".to_string())
        .expect("last_name is a store key");
}
