//! Alignment and comparison throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use xval_core::signal::SignalMetrics;
use xval_core::{Aligner, Comparator, Datapoint, SensorType};

/// Reference at 50 Hz, device at 100 Hz with 1 ms of skew.
fn streams(reference_len: usize) -> (Vec<Datapoint>, Vec<Datapoint>) {
    let reference = (0..reference_len as i64)
        .map(|i| Datapoint::reference(i * 20_000_000, vec![0.01, -0.02, 9.81]))
        .collect();
    let device = (0..2 * reference_len as i64)
        .map(|i| Datapoint::device(i * 10_000_000 + 1_000_000, vec![0.012, -0.02, 9.805]))
        .collect();
    (reference, device)
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");
    let aligner = Aligner::default();

    for len in [250usize, 2_500, 25_000] {
        let (reference, device) = streams(len);
        group.throughput(Throughput::Elements((reference.len() + device.len()) as u64));
        group.bench_with_input(BenchmarkId::new("samples", len), &(reference, device), |b, (r, d)| {
            b.iter(|| aligner.pair(black_box(r), black_box(d)))
        });
    }

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");
    let comparator = Comparator::new(SensorType::Accelerometer.config(), f32::MAX, 5.0);

    for len in [250usize, 2_500, 25_000] {
        let (reference, device) = streams(len);
        let alignment = Aligner::default().pair(&reference, &device);
        group.throughput(Throughput::Elements(alignment.len() as u64));
        group.bench_with_input(BenchmarkId::new("pairs", len), &alignment, |b, a| {
            b.iter(|| comparator.compare(black_box(a)))
        });
    }

    group.finish();
}

fn bench_signal_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_metrics");

    // One second of 16 kHz audio.
    let samples: Vec<i16> = (0..16_000)
        .map(|i| ((i as f64 * 0.05).sin() * 3000.0) as i16)
        .collect();
    group.throughput(Throughput::Elements(samples.len() as u64));
    group.bench_function("compute_16k", |b| {
        b.iter(|| SignalMetrics::compute(black_box(&samples)))
    });

    group.finish();
}

criterion_group!(benches, bench_align, bench_compare, bench_signal_metrics);
criterion_main!(benches);
