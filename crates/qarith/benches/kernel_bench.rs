use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qarith::prelude::*;

fn codes(n: usize) -> Vec<i8> {
    (0..n).map(|i| (i % 256) as u8 as i8).collect()
}

fn bench_sub_same_shape(c: &mut Criterion) {
    let mut group = c.benchmark_group("sub_same_shape");
    let pa = QuantizationParams::new(0.05, -3);
    let pb = QuantizationParams::new(0.02, 11);
    let out = QuantizationParams::new(0.1, 0);
    for &n in &[256usize, 4096, 65536, 1 << 20] {
        let a = QuantizedTensor::new(n, codes(n), pa).unwrap();
        let b = QuantizedTensor::new(n, codes(n), pb).unwrap();
        for (label, config) in [
            ("sequential", KernelConfig::default().sequential()),
            ("parallel", KernelConfig::default().parallel_threshold(0)),
        ] {
            group.bench_with_input(BenchmarkId::new(label, n), &n, |bench, _| {
                bench.iter(|| {
                    binary_op(black_box(&a), black_box(&b), &out, BinaryOp::Sub, &config).unwrap()
                });
            });
        }
    }
    group.finish();
}

fn bench_add_broadcast_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_broadcast_row");
    let params = QuantizationParams::new(0.25, 0);
    for &rows in &[16usize, 256, 4096] {
        let cols = 256;
        let a = QuantizedTensor::new((rows, cols), codes(rows * cols), params).unwrap();
        let row = QuantizedTensor::new(cols, codes(cols), params).unwrap();
        let config = KernelConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |bench, _| {
            bench.iter(|| {
                binary_op(black_box(&a), black_box(&row), &params, BinaryOp::Add, &config).unwrap()
            });
        });
    }
    group.finish();
}

fn bench_generated_suite(c: &mut Criterion) {
    let set = ConformanceGenerator::new(GeneratorConfig::default())
        .generate::<i8>()
        .unwrap();
    let config = KernelConfig::default();
    c.bench_function("run_generated_suite", |bench| {
        bench.iter(|| set.run(FixtureVariant::AllInputsAsInternal, &config));
    });
}

criterion_group!(
    benches,
    bench_sub_same_shape,
    bench_add_broadcast_row,
    bench_generated_suite
);
criterion_main!(benches);
