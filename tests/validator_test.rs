//! End-to-end cross-validation runs over in-memory sequences.

use xval_core::{
    CrossValidator, Datapoint, SensorType, Source, ValidationError, ValidatorConfig,
};

const MS: i64 = 1_000_000;

fn stream(source: Source, count: i64, period: i64, offset: i64, values: &[f32]) -> Vec<Datapoint> {
    (0..count)
        .map(|i| Datapoint::new(source, i * period + offset, values.to_vec()))
        .collect()
}

#[test]
fn test_gyroscope_run_passes_with_partial_overlap() {
    // Device starts 100 ms later, so only the tail of the reference matches.
    let reference = stream(Source::Reference, 50, 20 * MS, 0, &[0.01, -0.02, 0.0]);
    let device = stream(Source::DeviceUnderTest, 50, 20 * MS, 100 * MS + MS, &[0.012, -0.02, 0.005]);

    let outcome = CrossValidator::default()
        .validate_sequences(SensorType::Gyroscope, &reference, &device, f32::MAX)
        .unwrap();
    assert_eq!(outcome.pairs, 45);
    assert!((outcome.match_ratio - 0.9).abs() < 1e-9);
    assert_eq!(outcome.sensor, SensorType::Gyroscope);
}

#[test]
fn test_disjoint_time_ranges_fail_alignment() {
    let reference = stream(Source::Reference, 10, 20 * MS, 0, &[1013.0]);
    let device = stream(Source::DeviceUnderTest, 10, 20 * MS, 10_000 * MS, &[1013.0]);
    let err = CrossValidator::default()
        .validate_sequences(SensorType::Pressure, &reference, &device, f32::MAX)
        .unwrap_err();
    assert!(matches!(err, ValidationError::AlignmentFailure { reference: 10, device: 10 }));
    assert!(err.is_data_failure());
}

#[test]
fn test_proximity_run_uses_near_far() {
    let reference = vec![
        Datapoint::reference(0, vec![0.0]),
        Datapoint::reference(200 * MS, vec![8.0]),
    ];
    let device = vec![
        Datapoint::device(MS, vec![0.0]),
        Datapoint::device(201 * MS, vec![5.0]),
    ];
    let validator = CrossValidator::default();
    validator
        .validate_sequences(SensorType::Proximity, &reference, &device, 10.0)
        .unwrap();

    let flipped = vec![Datapoint::device(MS, vec![5.0]), Datapoint::device(201 * MS, vec![5.0])];
    let err = validator
        .validate_sequences(SensorType::Proximity, &reference, &flipped, 10.0)
        .unwrap_err();
    assert!(matches!(err, ValidationError::ComparisonMismatch { first_index: 0, .. }));
}

#[test]
fn test_tighter_skew_bound_drops_pairs() {
    let reference = stream(Source::Reference, 10, 20 * MS, 0, &[100.0]);
    let device = stream(Source::DeviceUnderTest, 10, 20 * MS, 3 * MS, &[100.0]);
    let strict = CrossValidator::new(&ValidatorConfig {
        max_skew_ns: 2 * MS,
        ..Default::default()
    });
    let err = strict
        .validate_sequences(SensorType::Light, &reference, &device, f32::MAX)
        .unwrap_err();
    assert!(matches!(err, ValidationError::AlignmentFailure { .. }));

    let outcome = CrossValidator::default()
        .validate_sequences(SensorType::Light, &reference, &device, f32::MAX)
        .unwrap();
    assert_eq!(outcome.pairs, 10);
}

#[test]
fn test_missing_reference_is_reported_after_device_check() {
    let device = stream(Source::DeviceUnderTest, 3, 20 * MS, 0, &[7.0]);
    let err = CrossValidator::default()
        .validate_sequences(SensorType::StepCounter, &[], &device, f32::MAX)
        .unwrap_err();
    assert_eq!(err.to_string(), "Did not find any reference datapoints");
}

#[test]
fn test_each_run_gets_its_own_id() {
    let reference = stream(Source::Reference, 3, 20 * MS, 0, &[1.0]);
    let device = stream(Source::DeviceUnderTest, 3, 20 * MS, 0, &[1.0]);
    let validator = CrossValidator::default();
    let a = validator
        .validate_sequences(SensorType::Light, &reference, &device, f32::MAX)
        .unwrap();
    let b = validator
        .validate_sequences(SensorType::Light, &reference, &device, f32::MAX)
        .unwrap();
    assert_ne!(a.run_id, b.run_id);
}
