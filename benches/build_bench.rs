use buildmap::{build_map, build_map_with_capacity, build_set, ImmutableMap};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_build_map(c: &mut Criterion) {
    let keys: Vec<String> = lcg(1).take(10_000).map(key).collect();
    c.bench_function("build_map_10k", |b| {
        b.iter(|| {
            let m = build_map(|m| {
                for (i, k) in keys.iter().enumerate() {
                    m.insert(k.clone(), i as u64);
                }
            });
            black_box(m)
        })
    });
    c.bench_function("build_map_with_capacity_10k", |b| {
        b.iter(|| {
            let m = build_map_with_capacity(keys.len(), |m| {
                for (i, k) in keys.iter().enumerate() {
                    m.insert(k.clone(), i as u64);
                }
            })
            .unwrap();
            black_box(m)
        })
    });
    // Baseline: unordered std map with the same inserts.
    c.bench_function("std_hashmap_10k", |b| {
        b.iter(|| {
            let mut m = HashMap::with_capacity(keys.len());
            for (i, k) in keys.iter().enumerate() {
                m.insert(k.clone(), i as u64);
            }
            black_box(m)
        })
    });
}

fn bench_build_set(c: &mut Criterion) {
    let items: Vec<u64> = lcg(3).take(10_000).map(|x| x % 5_000).collect();
    c.bench_function("build_set_10k_with_dups", |b| {
        b.iter(|| black_box(build_set(|s| s.extend(items.iter().copied()))))
    });
}

fn bench_lookup(c: &mut Criterion) {
    let keys: Vec<String> = lcg(7).take(20_000).map(key).collect();
    let m: ImmutableMap<String, u64> = keys
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, k)| (k, i as u64))
        .collect();
    let mut hit = keys.iter().cycle();
    c.bench_function("immutable_map_get_hit", |b| {
        b.iter(|| black_box(m.get(hit.next().unwrap())))
    });
    let mut miss = lcg(0xdead_beef);
    c.bench_function("immutable_map_get_miss", |b| {
        b.iter(|| black_box(m.get(&key(miss.next().unwrap()))))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_build_map, bench_build_set, bench_lookup
}
criterion_main!(benches);
