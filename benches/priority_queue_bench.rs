use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use priority_collections::PriorityExtractionQueue;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn filled(n: usize) -> PriorityExtractionQueue<u64> {
    let mut q = PriorityExtractionQueue::with_capacity(n);
    for x in lcg(5).take(n) {
        q.insert(x, (x % 32) as i64);
    }
    q
}

fn bench_insert_extract(c: &mut Criterion) {
    c.bench_function("queue::insert_extract_10k", |b| {
        b.iter_batched(
            PriorityExtractionQueue::<u64>::new,
            |mut q| {
                for x in lcg(1).take(10_000) {
                    q.insert(x, (x % 32) as i64);
                }
                while let Ok(v) = q.extract() {
                    black_box(v);
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_drain(c: &mut Criterion) {
    c.bench_function("queue::drain_10k", |b| {
        b.iter_batched(
            || filled(10_000),
            |mut q| {
                let n = q.drain().count();
                black_box(n)
            },
            BatchSize::SmallInput,
        )
    });
}

// Removal rebuilds the heap, so this is linear in the queue size.
fn bench_remove(c: &mut Criterion) {
    c.bench_function("queue::remove_rebuild_1k", |b| {
        let values: Vec<u64> = lcg(5).take(1_000).collect();
        b.iter_batched(
            || filled(1_000),
            |mut q| {
                for v in values.iter().step_by(10) {
                    black_box(q.remove(v));
                }
                black_box(q)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_blob_round_trip(c: &mut Criterion) {
    c.bench_function("queue::blob_round_trip_1k", |b| {
        let q = filled(1_000);
        b.iter(|| {
            let blob = q.to_blob().unwrap();
            let r: PriorityExtractionQueue<u64> = PriorityExtractionQueue::from_blob(&blob).unwrap();
            black_box(r)
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
    targets = bench_insert_extract, bench_drain, bench_remove, bench_blob_round_trip
}
criterion_main!(benches);
