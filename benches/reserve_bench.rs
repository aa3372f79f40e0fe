//! Benchmarks for reservd store operations

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use reservd::EventStore;

fn reserve_benchmarks(c: &mut Criterion) {
    c.bench_function("reserve_single_seat", |b| {
        b.iter_batched(
            || {
                let store = EventStore::new(Duration::ZERO);
                store.create(1, 100, 100).unwrap();
                store
            },
            |store| store.reserve(1, &[(50, 50)]).unwrap(),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("reserve_full_row", |b| {
        b.iter_batched(
            || {
                let store = EventStore::new(Duration::ZERO);
                store.create(1, 100, 100).unwrap();
                store
            },
            |store| {
                let seats: Vec<_> = (1..=100).map(|col| (1, col)).collect();
                store.reserve(1, &seats).unwrap()
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("show_100x100", |b| {
        let store = EventStore::new(Duration::ZERO);
        store.create(1, 100, 100).unwrap();
        store.reserve(1, &[(1, 1), (100, 100)]).unwrap();

        b.iter(|| store.show(1).unwrap());
    });

    c.bench_function("list_1000_events", |b| {
        let store = EventStore::new(Duration::ZERO);
        for id in 0..1000 {
            store.create(id, 1, 1).unwrap();
        }

        b.iter(|| store.list());
    });
}

criterion_group!(benches, reserve_benchmarks);
criterion_main!(benches);
