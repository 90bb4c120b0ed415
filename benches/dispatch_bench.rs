// In benches/dispatch_bench.rs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use khiva::algorithms::{features, normalization};
use khiva::{Array, Context};
use rand::Rng;

fn random_series(len: usize) -> Vec<f64> {
    let mut rng = rand::rng();
    (0..len).map(|_| rng.random::<f64>()).collect()
}

/// Round trip of a tiny array: dominated by dispatch and reconciliation.
fn bench_dispatch_overhead(c: &mut Criterion) {
    let ctx = Context::host();
    let a = Array::new(&ctx, &[1.0f64], &[1]).unwrap();
    let b = Array::new(&ctx, &[2.0f64], &[1]).unwrap();

    let mut group = c.benchmark_group("Dispatch Overhead");
    group.bench_function("add (2->1)", |bench| {
        bench.iter(|| black_box((&a + &b).unwrap()))
    });
    group.bench_function("add self-aliased (2->1)", |bench| {
        bench.iter(|| black_box((&a + &a).unwrap()))
    });
    group.bench_function("znorm in place (1->0)", |bench| {
        bench.iter(|| normalization::znorm_in_place(black_box(&a), normalization::DEFAULT_EPSILON).unwrap())
    });
    group.finish();
}

fn bench_marshalling(c: &mut Criterion) {
    let ctx = Context::host();
    let mut group = c.benchmark_group("Marshalling");
    for len in [1_024usize, 65_536] {
        let data = random_series(len);
        group.throughput(criterion::Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("create + read f64", len), &data, |bench, data| {
            bench.iter(|| {
                let arr = Array::new(&ctx, black_box(data), &[data.len() as u64]).unwrap();
                black_box(arr.get_data::<f64>().unwrap())
            })
        });
    }
    group.finish();
}

fn bench_features(c: &mut Criterion) {
    let ctx = Context::host();
    let data = random_series(16 * 1_024);
    let tss = Array::new(&ctx, &data, &[1_024, 16]).unwrap();

    let mut group = c.benchmark_group("Features");
    group.bench_function("mean [1024 x 16]", |bench| {
        bench.iter(|| black_box(features::mean(&tss).unwrap()))
    });
    group.bench_function("standard_deviation [1024 x 16]", |bench| {
        bench.iter(|| black_box(features::standard_deviation(&tss).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_dispatch_overhead, bench_marshalling, bench_features);
criterion_main!(benches);
