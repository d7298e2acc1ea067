//! Tests for sensor type settings, the AP/CHRE mapping, and the roster.

use std::time::Duration;

use xval_core::sensor::type_map::chre;
use xval_core::sensor::{
    CollectionTimings, RosterDecision, SensorDescriptor, SensorInfo, SensorRoster, SkipReason,
};
use xval_core::{ComparisonPolicy, SensorType, SensorTypeMap, ValidationError};

#[test]
fn test_standard_map_is_a_bijection() {
    let map = SensorTypeMap::standard();
    assert_eq!(map.len(), SensorType::ALL.len());
    for sensor in SensorType::ALL {
        let chre_type = map.to_chre(sensor.ap_type()).unwrap();
        assert_eq!(map.to_ap(chre_type), Some(sensor.ap_type()));
    }
}

#[test]
fn test_known_chre_codes() {
    let map = SensorTypeMap::standard();
    assert_eq!(map.to_chre(SensorType::Accelerometer.ap_type()), Some(chre::ACCELEROMETER));
    assert_eq!(map.to_chre(SensorType::Gyroscope.ap_type()), Some(chre::GYROSCOPE));
    assert_eq!(map.to_chre(SensorType::MagneticField.ap_type()), Some(chre::GEOMAGNETIC_FIELD));
    assert_eq!(map.to_chre(SensorType::StepCounter.ap_type()), Some(chre::STEP_COUNTER));
    assert_eq!(map.to_ap(99), None);
}

#[test]
fn test_map_rejects_duplicate_values() {
    let err = SensorTypeMap::from_pairs(&[(1, 1), (4, 1)]).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidTypeMap(_)));
}

#[test]
fn test_unknown_ap_type_is_an_error() {
    assert!(matches!(
        SensorType::from_ap_type(3),
        Err(ValidationError::UnknownSensorType(3))
    ));
}

#[test]
fn test_config_table() {
    let light = SensorType::Light.config();
    assert_eq!(light.expected_values_length, 1);
    assert!((light.error_margin - 0.07).abs() < f32::EPSILON);

    let mag = SensorType::MagneticField.config();
    assert_eq!(mag.expected_values_length, 3);
    assert_eq!(mag.comparison_policy, ComparisonPolicy::NumericTolerance);

    assert_eq!(
        SensorType::Proximity.config().comparison_policy,
        ComparisonPolicy::NearFarThreshold
    );
}

#[test]
fn test_descriptor_from_json_uses_defaults() {
    let sensor: SensorDescriptor = serde_json::from_str(
        r#"{"name": "baro", "sensor_type": "pressure", "reporting_mode": "on_change"}"#,
    )
    .unwrap();
    assert!(!sensor.is_continuous());
    assert_eq!(sensor.max_range, f32::MAX);

    let timings = CollectionTimings::default();
    assert_eq!(sensor.await_timeout(&timings), Duration::from_millis(1000));
    assert_eq!(sensor.sampling_interval(&timings), Duration::from_millis(20));
}

#[test]
fn test_roster_validates_each_device_index_once() {
    let map = SensorTypeMap::standard();
    let wake = SensorDescriptor::new("accel wakeup", SensorType::Accelerometer);
    let plain = SensorDescriptor::new("accel", SensorType::Accelerometer);
    let mut roster = SensorRoster::new([wake.clone(), plain.clone(), wake.clone()]);
    assert_eq!(roster.sensors().len(), 2);

    let info = SensorInfo {
        chre_sensor_type: chre::ACCELEROMETER,
        is_available: true,
        sensor_index: Some(2),
    };
    assert_eq!(
        roster.decide(&wake, &info, map).unwrap(),
        RosterDecision::Validate { sensor_index: 2 }
    );
    assert_eq!(
        roster.decide(&plain, &info, map).unwrap(),
        RosterDecision::Skip(SkipReason::AlreadyTested(2))
    );
}
