// SPDX-License-Identifier: PMPL-1.0-or-later
//! Performance benchmarks for PathStore backends and migration

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use pathstore_migrate::{MigrationStrategy, Migrator, MigratorConfig};
use pathstore_storage::key::sanitize_key;
use pathstore_storage::{Kv, MemoryStorage, Storage};

/// `fanout` namespaces with `fanout` leaves each, e.g. `/ns-3/leaf-7`.
fn tree(fanout: usize) -> Vec<Kv> {
    (0..fanout)
        .flat_map(|ns| (0..fanout).map(move |leaf| Kv::new(format!("/ns-{ns}/leaf-{leaf}"), "value")))
        .collect()
}

fn seeded(rt: &Runtime, kvs: &[Kv]) -> MemoryStorage {
    let store = MemoryStorage::default();
    rt.block_on(store.put(kvs)).unwrap();
    store
}

// ============================================================================
// Key Sanitizer Benchmarks
// ============================================================================

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");

    for key in ["a", "/a/b/c/", "deep/path/with/many/segments/in/it"] {
        group.bench_with_input(BenchmarkId::from_parameter(key), key, |b, key| {
            b.iter(|| black_box(sanitize_key(key).unwrap()))
        });
    }

    group.finish();
}

// ============================================================================
// Memory Backend Benchmarks
// ============================================================================

fn bench_memory_put(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("memory_put");

    for batch in [1usize, 16, 256] {
        let kvs: Vec<Kv> = (0..batch)
            .map(|i| Kv::new(format!("/batch/key-{i}"), "value"))
            .collect();
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &kvs, |b, kvs| {
            let store = MemoryStorage::default();
            b.to_async(&rt).iter(|| async { store.put(kvs).await.unwrap() });
        });
    }

    group.finish();
}

fn bench_memory_list(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("memory_list");

    for fanout in [10usize, 100] {
        let store = seeded(&rt, &tree(fanout));

        group.bench_with_input(BenchmarkId::new("child", fanout), &fanout, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(store.list("/ns-1").await.unwrap()) });
        });

        group.bench_with_input(BenchmarkId::new("root", fanout), &fanout, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(store.list("/").await.unwrap()) });
        });
    }

    group.finish();
}

// ============================================================================
// Migration Benchmarks
// ============================================================================

fn bench_migrate_noop(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("migrate_noop");
    let kvs = tree(30);

    for strategy in [MigrationStrategy::Diff, MigrationStrategy::Marker] {
        let migrator = Migrator::new(MigratorConfig {
            strategy,
            ..Default::default()
        })
        .unwrap();
        let src = seeded(&rt, &kvs);
        let dst = MemoryStorage::default();
        rt.block_on(migrator.migrate(&dst, &src)).unwrap();

        group.bench_function(format!("{strategy:?}"), |b| {
            b.to_async(&rt)
                .iter(|| async { black_box(migrator.migrate(&dst, &src).await.unwrap()) });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sanitize,
    bench_memory_put,
    bench_memory_list,
    bench_migrate_noop
);
criterion_main!(benches);
