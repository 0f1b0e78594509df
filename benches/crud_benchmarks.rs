use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use size_bst::OrderedTree;
use std::collections::BTreeMap;

const N: usize = 10_000;
// Sorted input degrades the tree to a list, so those runs stay smaller.
const SPINE_N: usize = 2_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn lookup_sum(tree: &OrderedTree<i64, i64>, keys: &[i64]) -> i64 {
    let mut sum = 0i64;
    for k in keys {
        if let Some(&v) = tree.get(k) {
            sum = sum.wrapping_add(v);
        }
    }
    sum
}

// ─── Point operations ───────────────────────────────────────────────────────

fn bench_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("insert_random");

    group.bench_function(BenchmarkId::new("OrderedTree", N), |b| {
        b.iter(|| {
            let mut tree = OrderedTree::new();
            for &k in &keys {
                tree.insert(k, k);
            }
            tree
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_get_after_sorted_insert(c: &mut Criterion) {
    let keys = ordered_keys(SPINE_N);
    let spine: OrderedTree<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let mut balanced = spine.clone();
    balanced.balance();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("get_after_sorted_insert");

    group.bench_function(BenchmarkId::new("OrderedTree/unbalanced", SPINE_N), |b| {
        b.iter(|| lookup_sum(&spine, &keys));
    });

    group.bench_function(BenchmarkId::new("OrderedTree/balanced", SPINE_N), |b| {
        b.iter(|| lookup_sum(&balanced, &keys));
    });

    group.bench_function(BenchmarkId::new("BTreeMap", SPINE_N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for k in &keys {
                if let Some(&v) = bt_map.get(k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

fn bench_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let tree: OrderedTree<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let mut group = c.benchmark_group("remove_random");

    group.bench_function(BenchmarkId::new("OrderedTree", N), |b| {
        b.iter_batched(
            || tree.clone(),
            |mut tree| {
                for k in &keys {
                    tree.remove(k);
                }
                tree
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

// ─── Order statistics ───────────────────────────────────────────────────────

fn bench_rank_select(c: &mut Criterion) {
    let keys = random_keys(N);
    let tree: OrderedTree<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let mut group = c.benchmark_group("rank_select");

    group.bench_function(BenchmarkId::new("rank", N), |b| {
        b.iter(|| keys.iter().map(|k| tree.rank(k)).sum::<usize>());
    });

    group.bench_function(BenchmarkId::new("select", N), |b| {
        b.iter(|| (0..tree.len()).filter_map(|k| tree.select(k)).count());
    });

    group.bench_function(BenchmarkId::new("floor+ceiling", N), |b| {
        b.iter(|| {
            keys.iter()
                .filter(|&&k| tree.floor(&(k - 1)).is_some() && tree.ceiling(&(k + 1)).is_some())
                .count()
        });
    });

    group.finish();
}

// ─── Rebalancing ────────────────────────────────────────────────────────────

fn bench_balance(c: &mut Criterion) {
    let mut group = c.benchmark_group("balance");

    for (label, keys) in [("random", random_keys(N)), ("sorted", ordered_keys(SPINE_N))] {
        let tree: OrderedTree<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        group.bench_function(BenchmarkId::new(label, keys.len()), |b| {
            b.iter_batched(
                || tree.clone(),
                |mut tree| {
                    tree.balance();
                    tree
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(point_benches, bench_insert_random, bench_get_after_sorted_insert, bench_remove_random,);

criterion_group!(order_benches, bench_rank_select, bench_balance,);

criterion_main!(point_benches, order_benches);
