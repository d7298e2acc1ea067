//! Fuzz target for alignment and comparison over arbitrary sorted streams.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xval_core::{Aligner, Comparator, Datapoint, SensorType};

#[derive(Debug, Arbitrary)]
struct Input {
    max_skew_ns: i64,
    reference: Vec<(i64, f32)>,
    device: Vec<(i64, f32)>,
}

fuzz_target!(|input: Input| {
    let mut reference: Vec<Datapoint> = input
        .reference
        .iter()
        .map(|&(t, v)| Datapoint::reference(t, vec![v]))
        .collect();
    let mut device: Vec<Datapoint> = input
        .device
        .iter()
        .map(|&(t, v)| Datapoint::device(t, vec![v]))
        .collect();
    reference.sort_by_key(|d| d.timestamp);
    device.sort_by_key(|d| d.timestamp);

    let aligner = Aligner::new(input.max_skew_ns);
    let alignment = aligner.pair(&reference, &device);
    assert!(alignment.len() <= reference.len().min(device.len()));
    for pair in &alignment.pairs {
        assert!((pair.reference.timestamp.abs_diff(pair.device.timestamp) as i128) < aligner.max_skew_ns() as i128);
    }

    let comparator = Comparator::new(SensorType::Pressure.config(), f32::MAX, 5.0);
    let report = comparator.compare(&alignment).unwrap();
    assert_eq!(report.pairs, alignment.len());
});
