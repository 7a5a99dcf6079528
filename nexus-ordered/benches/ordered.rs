//! Benchmarks comparing the ordered containers against std's BTreeMap.
//!
//! Run with: cargo bench -p nexus-ordered
//!
//! Keys are shuffled once up front so every run sees the same order.

use std::collections::BTreeMap;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use nexus_ordered::{BoxedStorage, Entry, LinkedMap, NaturalOrder, OrderedMap};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const COUNT: usize = 10_000;

type BoxedMap = OrderedMap<u64, u64, NaturalOrder, u32, BoxedStorage<Entry<u64, u64>>>;

fn shuffled_keys() -> Vec<u64> {
    let mut keys: Vec<u64> = (0..COUNT as u64).collect();
    keys.shuffle(&mut SmallRng::seed_from_u64(42));
    keys
}

fn boxed_map() -> BoxedMap {
    OrderedMap::with_storage(BoxedStorage::with_capacity(COUNT), NaturalOrder)
}

// ============================================================================
// Insert + Clear
// ============================================================================

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.throughput(Throughput::Elements(COUNT as u64));
    let keys = shuffled_keys();

    let mut vec_map: OrderedMap<u64, u64> = OrderedMap::new();
    group.bench_function("ordered_map/vec", |b| {
        b.iter(|| {
            for &k in &keys {
                black_box(vec_map.add(k, k).unwrap());
            }
            vec_map.clear();
        });
    });

    let mut boxed = boxed_map();
    group.bench_function("ordered_map/boxed", |b| {
        b.iter(|| {
            for &k in &keys {
                black_box(boxed.add(k, k).unwrap());
            }
            boxed.clear();
        });
    });

    let mut std_map = BTreeMap::new();
    group.bench_function("btreemap", |b| {
        b.iter(|| {
            for &k in &keys {
                black_box(std_map.insert(k, k));
            }
            std_map.clear();
        });
    });

    group.finish();
}

// ============================================================================
// Lookup
// ============================================================================

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(COUNT as u64));
    let keys = shuffled_keys();

    let mut boxed = boxed_map();
    let mut std_map = BTreeMap::new();
    for &k in &keys {
        boxed.add(k, k).unwrap();
        std_map.insert(k, k);
    }

    group.bench_function("ordered_map/boxed", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for k in &keys {
                sum += black_box(*boxed.get(k).unwrap());
            }
            sum
        });
    });

    group.bench_function("btreemap", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for k in &keys {
                sum += black_box(*std_map.get(k).unwrap());
            }
            sum
        });
    });

    group.finish();
}

// ============================================================================
// Churn: remove + re-insert at random keys
// ============================================================================

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    group.throughput(Throughput::Elements(COUNT as u64));
    let keys = shuffled_keys();

    let mut boxed = boxed_map();
    let mut std_map = BTreeMap::new();
    for &k in &keys {
        boxed.add(k, k).unwrap();
        std_map.insert(k, k);
    }

    group.bench_function("ordered_map/boxed", |b| {
        b.iter(|| {
            for &k in &keys {
                let v = boxed.remove(&k).unwrap();
                black_box(boxed.add(k, v).unwrap());
            }
        });
    });

    group.bench_function("btreemap", |b| {
        b.iter(|| {
            for &k in &keys {
                let v = std_map.remove(&k).unwrap();
                black_box(std_map.insert(k, v));
            }
        });
    });

    group.finish();
}

// ============================================================================
// LRU touch: find by key, move to the back of the list
// ============================================================================

fn bench_lru_touch(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_touch");
    group.throughput(Throughput::Elements(COUNT as u64));
    let keys = shuffled_keys();

    let mut lru: LinkedMap<u64, u64> = LinkedMap::new();
    for k in 0..COUNT as u64 {
        lru.append(k, k).unwrap();
    }

    group.bench_function("linked_map", |b| {
        b.iter(|| {
            for k in &keys {
                let h = lru.find(k).unwrap();
                lru.move_to_back(h).unwrap();
            }
            black_box(lru.first().unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_get, bench_churn, bench_lru_touch);
criterion_main!(benches);
