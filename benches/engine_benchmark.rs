//! Forward and backward throughput on an MNIST-sized network
//!
//! Compares the rayon backend against the single-threaded reference on `[784, 256, 10]`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ffnet::backend::{ComputeBackend, CpuBackend, SerialBackend};
use ffnet::builders::NetworkBuilder;
use ffnet::network::NeuralNetwork;

const TOPOLOGY: [usize; 3] = [784, 256, 10];

fn network<B: ComputeBackend>(backend: B) -> NeuralNetwork<B> {
    NetworkBuilder::new(&TOPOLOGY).seed(42).build_with(backend).unwrap()
}

fn sample() -> Vec<f64> {
    (0..TOPOLOGY[0]).map(|i| (i % 256) as f64 / 255.0).collect()
}

fn bench_forward(c: &mut Criterion) {
    let input = sample();
    let mut group = c.benchmark_group("forward");

    let mut cpu = network(CpuBackend::new());
    group.bench_function(BenchmarkId::new("cpu", "784-256-10"), |b| {
        b.iter(|| cpu.forward(black_box(&input)).unwrap())
    });

    let mut serial = network(SerialBackend::new());
    group.bench_function(BenchmarkId::new("serial", "784-256-10"), |b| {
        b.iter(|| {
            serial.backend_mut().clear_log();
            serial.forward(black_box(&input)).unwrap()
        })
    });

    group.finish();
}

fn bench_train_sample(c: &mut Criterion) {
    let input = sample();
    let mut group = c.benchmark_group("train_sample");

    let mut cpu = network(CpuBackend::new());
    group.bench_function(BenchmarkId::new("cpu", "784-256-10"), |b| {
        b.iter(|| cpu.train_sample(black_box(&input), 7).unwrap())
    });

    let mut serial = network(SerialBackend::new());
    group.bench_function(BenchmarkId::new("serial", "784-256-10"), |b| {
        b.iter(|| {
            serial.backend_mut().clear_log();
            serial.train_sample(black_box(&input), 7).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_forward, bench_train_sample);
criterion_main!(benches);
