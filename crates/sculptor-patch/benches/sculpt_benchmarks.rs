//! Benchmarks for gradient generation and prefix targeting.
//!
//! Run with: cargo bench -p sculptor-patch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sculptor_core::{gradient, ArchitectureFamily, GradientShape};
use sculptor_patch::{keys_with_prefix, KeyPatches, RecordingModel, Sculptor};

/// Generate a Flux-like key namespace with `per_block` tensors in every block.
fn generate_flux_keys(per_block: usize) -> KeyPatches<()> {
    let sculptor = Sculptor::for_family(ArchitectureFamily::Flux).unwrap();
    let keys = sculptor
        .table()
        .all_prefixes()
        .into_iter()
        .flat_map(|prefix| (0..per_block).map(move |i| (format!("{prefix}tensor_{i}.weight"), ())))
        .collect();
    keys
}

/// Benchmark curve generation per shape.
fn bench_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("gradient");
    let mut rng = gradient::seeded_rng(Some(0));

    for shape in GradientShape::ALL {
        group.bench_with_input(BenchmarkId::new(shape.name(), 62), &62usize, |b, &steps| {
            b.iter(|| gradient::generate(black_box(shape), black_box(steps), &mut rng));
        });
    }

    group.finish();
}

/// Benchmark ordered range lookup against a linear `starts_with` scan.
fn bench_prefix_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefix_lookup");

    for per_block in [4, 32, 128].iter() {
        let keys = generate_flux_keys(*per_block);
        let prefix = "diffusion_model.single_blocks.17.";

        group.throughput(Throughput::Elements(keys.len() as u64));

        group.bench_with_input(BenchmarkId::new("range", per_block), per_block, |b, _| {
            b.iter(|| keys_with_prefix(black_box(&keys), black_box(prefix)).count());
        });

        group.bench_with_input(BenchmarkId::new("scan", per_block), per_block, |b, _| {
            b.iter(|| {
                black_box(&keys)
                    .keys()
                    .filter(|k| k.starts_with(black_box(prefix)))
                    .count()
            });
        });
    }

    group.finish();
}

/// Benchmark a full sculpt into the recording host.
fn bench_sculpt(c: &mut Criterion) {
    let mut group = c.benchmark_group("sculpt");
    let sculptor = Sculptor::for_family(ArchitectureFamily::Flux).unwrap();

    for per_block in [4, 32].iter() {
        let model = RecordingModel::new(generate_flux_keys(*per_block));

        group.bench_with_input(BenchmarkId::new("all", per_block), per_block, |b, _| {
            b.iter(|| {
                let outcome = sculptor
                    .sculpt(black_box(&model), GradientShape::EaseInOutSine, 0.5, "all")
                    .unwrap();
                black_box(outcome.is_sculpted())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_gradient, bench_prefix_lookup, bench_sculpt);
criterion_main!(benches);
