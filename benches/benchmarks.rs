use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use satchel::Store;

fn keyed_store(keys: usize) -> Store<usize, i64> {
    (0..keys)
        .fold(Store::builder(), |builder, key| builder.value(key, 0))
        .build()
        .unwrap()
}

fn store_creation_benchmark(c: &mut Criterion) {
    c.bench_function("store_creation", |b| {
        b.iter(|| keyed_store(black_box(16)));
    });
}

fn store_read_benchmark(c: &mut Criterion) {
    let store = keyed_store(16);

    c.bench_function("store_read", |b| {
        b.iter(|| {
            black_box(store.get(&3));
        });
    });
}

fn action_dispatch_benchmark(c: &mut Criterion) {
    let store = keyed_store(16);
    let action = store.action(&3).unwrap();

    c.bench_function("action_dispatch", |b| {
        let mut i = 0;
        b.iter(|| {
            action.set(black_box(i));
            i += 1;
        });
    });
}

fn memo_snapshot_benchmark(c: &mut Criterion) {
    let store = keyed_store(16);
    let memo = store.memo(&[0, 1, 2, 3]).unwrap();

    c.bench_function("memo_snapshot_unchanged", |b| {
        b.iter(|| {
            black_box(memo.get());
        });
    });
}

fn fan_out_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for listeners in [1, 10, 100].iter() {
        let store = keyed_store(4);
        let subs: Vec<_> = (0..*listeners)
            .map(|_| {
                store
                    .subscribe(&[0], |v| {
                        black_box(v);
                    })
                    .unwrap()
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(listeners),
            listeners,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    store.set(&0, black_box(i)).unwrap();
                    i += 1;
                });
            },
        );
        drop(subs);
    }

    group.finish();
}

criterion_group!(
    benches,
    store_creation_benchmark,
    store_read_benchmark,
    action_dispatch_benchmark,
    memo_snapshot_benchmark,
    fan_out_benchmark
);
criterion_main!(benches);
