use arena_table::{Arena, HashTable, Heap};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_insert_heap(c: &mut Criterion) {
    c.bench_function("hash_table_insert_10k_heap", |b| {
        b.iter_batched(
            || HashTable::<u64, u64, Heap>::new().unwrap(),
            |mut t| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    t.add_or_set(&x, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_arena(c: &mut Criterion) {
    c.bench_function("hash_table_insert_10k_arena", |b| {
        b.iter_batched(
            Arena::new,
            |arena| {
                let mut t: HashTable<u64, u64, &Arena> = HashTable::new_in(&arena).unwrap();
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    t.add_or_set(&x, i as u64).unwrap();
                }
                black_box(t.len())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("hash_table_get_hit", |b| {
        let mut t: HashTable<u64, u64, Heap> = HashTable::new().unwrap();
        let keys: Vec<u64> = lcg(7).take(20_000).collect();
        for (i, k) in keys.iter().enumerate() {
            t.add_or_set(k, i as u64).unwrap();
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k).unwrap());
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("hash_table_get_miss", |b| {
        let mut t: HashTable<u64, u64, Heap> = HashTable::new().unwrap();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            t.add_or_set(&x, i as u64).unwrap();
        }
        // a disjoint stream: misses with overwhelming probability
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = miss.next().unwrap();
            black_box(t.contains(&k));
        })
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
    targets = bench_insert_heap, bench_insert_arena, bench_get_hit, bench_get_miss
}
criterion_main!(benches);
