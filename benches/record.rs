use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hdrtally::sync::{AtomicHistogram, LockedHistogram};
use hdrtally::{Counts, Histogram};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const HIGH: u64 = 3_600_000_000;
const NUM_THREADS: usize = 8;
const RECORDS_PER_THREAD: usize = 100_000;

fn random_values(n: usize) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(42);
    (0..n).map(|_| rng.gen_range(0..HIGH)).collect()
}

fn bench_record(c: &mut Criterion) {
    let values = random_values(1_000_000);
    let mut group = c.benchmark_group("record");

    group.bench_function("u64", |b| {
        let mut h: Histogram = Histogram::new_with_max(HIGH, 3).unwrap();
        b.iter(|| {
            for &v in &values {
                h.record(v).unwrap();
            }
        })
    });

    group.bench_function("u16 saturating", |b| {
        let mut h = Histogram::<Counts<u16>>::new_with_max(HIGH, 3).unwrap();
        b.iter(|| {
            for &v in &values {
                h.saturating_record(v);
            }
        })
    });

    group.bench_function("atomic single thread", |b| {
        let h = AtomicHistogram::new_with_max(HIGH, 3).unwrap();
        b.iter(|| {
            for &v in &values {
                h.record(v).unwrap();
            }
        })
    });

    group.finish();
}

fn bench_record_correct(c: &mut Criterion) {
    let values = random_values(10_000);
    let mut h: Histogram = Histogram::new_with_max(HIGH, 3).unwrap();

    c.bench_function("record_correct interval 1e6", |b| {
        b.iter(|| {
            for &v in &values {
                h.record_correct(v, 1_000_000).unwrap();
            }
        })
    });
}

fn bench_concurrent(c: &mut Criterion) {
    let values = Arc::new(random_values(RECORDS_PER_THREAD));
    let mut group = c.benchmark_group("concurrent_record");
    let label = format!("{}threads x {}records", NUM_THREADS, RECORDS_PER_THREAD);

    group.bench_function(BenchmarkId::new("atomic", &label), |b| {
        b.iter(|| {
            let h = Arc::new(AtomicHistogram::new_with_max(HIGH, 3).unwrap());
            let handles: Vec<_> = (0..NUM_THREADS)
                .map(|_| {
                    let h = Arc::clone(&h);
                    let values = Arc::clone(&values);
                    thread::spawn(move || {
                        for &v in values.iter() {
                            h.record(v).unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            black_box(h.len())
        })
    });

    group.bench_function(BenchmarkId::new("locked", &label), |b| {
        b.iter(|| {
            let h: Arc<LockedHistogram> =
                Arc::new(LockedHistogram::new_with_max(HIGH, 3).unwrap());
            let handles: Vec<_> = (0..NUM_THREADS)
                .map(|_| {
                    let h = Arc::clone(&h);
                    let values = Arc::clone(&values);
                    thread::spawn(move || {
                        for &v in values.iter() {
                            h.record(v).unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            black_box(h.len())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_record, bench_record_correct, bench_concurrent);
criterion_main!(benches);
