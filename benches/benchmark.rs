// Scoring pass benchmarks
use advertx_core::{normalize_batch, AdvertRecord, RawAdvert};
use advertx_similarity::SimilarityEngine;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;

/// Few distinct contacts and coarse prices so that a realistic share of pairs
/// gets linked.
fn generate_random_advert(rng: &mut impl Rng, id: u64) -> RawAdvert {
    let price = (rng.random_range(50..500) * 10) as f64;
    let area = format!("{} m2", rng.random_range(20..150));
    let contact = format!("(555) {:03}", rng.random_range(0..200));
    RawAdvert::new(id, price, area, contact)
}

fn generate_records(size: usize) -> Vec<AdvertRecord> {
    let mut rng = rand::rng();
    let batch: Vec<RawAdvert> = (0..size as u64)
        .map(|id| generate_random_advert(&mut rng, id))
        .collect();
    normalize_batch(&batch).expect("generated ids are unique")
}

fn benchmark_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");
    group.sample_size(10);
    let engine = SimilarityEngine::new();

    for size in [100, 1000, 5000].iter() {
        let records = generate_records(*size);
        group.bench_with_input(BenchmarkId::new("advertx", size), &records, |b, records| {
            b.iter(|| black_box(engine.build_index(black_box(records))));
        });
    }

    group.finish();
}

fn benchmark_pair_score(c: &mut Criterion) {
    let records = generate_records(2);
    let engine = SimilarityEngine::new();

    c.bench_function("pair_score", |b| {
        b.iter(|| black_box(engine.score(black_box(&records[0]), black_box(&records[1]))));
    });
}

fn benchmark_normalize(c: &mut Criterion) {
    let mut rng = rand::rng();
    let batch: Vec<RawAdvert> = (0..10_000)
        .map(|id| generate_random_advert(&mut rng, id))
        .collect();

    c.bench_function("normalize_batch_10k", |b| {
        b.iter(|| black_box(normalize_batch(black_box(&batch))));
    });
}

criterion_group!(benches, benchmark_build_index, benchmark_pair_score, benchmark_normalize);
criterion_main!(benches);
