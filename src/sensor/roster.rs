//! Decides which platform sensors of a type get a validation run.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::{SensorDescriptor, SensorTypeMap};
use crate::error::ValidationError;

/// Availability answer from the device for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorInfo {
    pub chre_sensor_type: i32,
    pub is_available: bool,
    pub sensor_index: Option<u32>,
}

/// Wait for the device's info response, failing after `timeout`.
pub async fn await_sensor_info(
    response: oneshot::Receiver<SensorInfo>,
    timeout: Duration,
) -> Result<SensorInfo, ValidationError> {
    match tokio::time::timeout(timeout, response).await {
        Ok(Ok(info)) => Ok(info),
        Ok(Err(_)) => Err(ValidationError::Collector("sensor info sender dropped".into())),
        Err(_) => Err(ValidationError::InfoTimeout(timeout.as_millis() as u64)),
    }
}

/// Why a sensor was not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotPresentOnDevice,
    AlreadyTested(u32),
}

/// Outcome of asking the roster about one sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterDecision {
    Validate { sensor_index: u32 },
    Skip(SkipReason),
}

/// Platform sensors of one type, de-duplicated by name, plus the set of
/// device sensor indices that have already been validated.
#[derive(Debug, Default)]
pub struct SensorRoster {
    sensors: Vec<SensorDescriptor>,
    tested: HashSet<u32>,
}

impl SensorRoster {
    /// Keep the first sensor for each name, in enumeration order.
    pub fn new(sensors: impl IntoIterator<Item = SensorDescriptor>) -> Self {
        let mut names = HashSet::new();
        let sensors = sensors
            .into_iter()
            .filter(|s| names.insert(s.name.clone()))
            .collect();
        Self { sensors, tested: HashSet::new() }
    }

    pub fn sensors(&self) -> &[SensorDescriptor] {
        &self.sensors
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Check an info response against the sensor being validated and decide
    /// whether to run it. Marks the index as tested when returning `Validate`.
    pub fn decide(
        &mut self,
        sensor: &SensorDescriptor,
        info: &SensorInfo,
        map: &SensorTypeMap,
    ) -> Result<RosterDecision, ValidationError> {
        let expected = sensor.sensor_type.ap_type();
        let actual = map
            .to_ap(info.chre_sensor_type)
            .ok_or(ValidationError::UnknownSensorType(info.chre_sensor_type))?;
        if actual != expected {
            return Err(ValidationError::SensorTypeMismatch { expected, actual });
        }

        let index = match (info.is_available, info.sensor_index) {
            (true, Some(index)) => index,
            _ => return Ok(RosterDecision::Skip(SkipReason::NotPresentOnDevice)),
        };
        if !self.tested.insert(index) {
            return Ok(RosterDecision::Skip(SkipReason::AlreadyTested(index)));
        }
        Ok(RosterDecision::Validate { sensor_index: index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::{type_map::chre, SensorType};

    fn info(available: bool, index: Option<u32>) -> SensorInfo {
        SensorInfo {
            chre_sensor_type: chre::ACCELEROMETER,
            is_available: available,
            sensor_index: index,
        }
    }

    #[test]
    fn test_duplicate_names_are_dropped() {
        let roster = SensorRoster::new([
            SensorDescriptor::new("bmi260 accel", SensorType::Accelerometer),
            SensorDescriptor::new("bmi260 accel", SensorType::Accelerometer),
            SensorDescriptor::new("bmi260 accel uncal", SensorType::Accelerometer),
        ]);
        assert_eq!(roster.sensors().len(), 2);
    }

    #[test]
    fn test_second_sensor_with_same_index_is_skipped() {
        let map = SensorTypeMap::standard();
        let sensor = SensorDescriptor::new("accel", SensorType::Accelerometer);
        let mut roster = SensorRoster::new([sensor.clone()]);

        let first = roster.decide(&sensor, &info(true, Some(0)), map).unwrap();
        assert_eq!(first, RosterDecision::Validate { sensor_index: 0 });
        let second = roster.decide(&sensor, &info(true, Some(0)), map).unwrap();
        assert_eq!(second, RosterDecision::Skip(SkipReason::AlreadyTested(0)));
    }

    #[test]
    fn test_unavailable_sensor_is_skipped() {
        let map = SensorTypeMap::standard();
        let sensor = SensorDescriptor::new("accel", SensorType::Accelerometer);
        let mut roster = SensorRoster::new([sensor.clone()]);
        let decision = roster.decide(&sensor, &info(false, None), map).unwrap();
        assert_eq!(decision, RosterDecision::Skip(SkipReason::NotPresentOnDevice));
    }

    #[test]
    fn test_info_for_other_type_is_rejected() {
        let map = SensorTypeMap::standard();
        let sensor = SensorDescriptor::new("gyro", SensorType::Gyroscope);
        let mut roster = SensorRoster::new([sensor.clone()]);
        let err = roster.decide(&sensor, &info(true, Some(1)), map).unwrap_err();
        assert!(matches!(err, ValidationError::SensorTypeMismatch { expected: 4, actual: 1 }));
    }

    #[tokio::test]
    async fn test_info_response_arrives() {
        let (tx, rx) = oneshot::channel();
        tx.send(info(true, Some(3))).unwrap();
        let got = await_sensor_info(rx, Duration::from_millis(100)).await.unwrap();
        assert_eq!(got.sensor_index, Some(3));
    }

    #[tokio::test]
    async fn test_info_response_times_out() {
        let (_tx, rx) = oneshot::channel::<SensorInfo>();
        let err = await_sensor_info(rx, Duration::from_millis(10)).await.unwrap_err();
        assert!(matches!(err, ValidationError::InfoTimeout(10)));
    }
}
