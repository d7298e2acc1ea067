//! Per-sensor-type comparison settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Sensor types that can be cross-validated.
///
/// Discriminants are the platform (AP) sensor type constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Accelerometer = 1,
    MagneticField = 2,
    Gyroscope = 4,
    Light = 5,
    Pressure = 6,
    Proximity = 8,
    StepCounter = 19,
}

impl SensorType {
    pub const ALL: [SensorType; 7] = [
        Self::Accelerometer,
        Self::MagneticField,
        Self::Gyroscope,
        Self::Light,
        Self::Pressure,
        Self::Proximity,
        Self::StepCounter,
    ];

    /// Platform sensor type constant.
    pub fn ap_type(self) -> i32 {
        self as i32
    }

    /// Look up a sensor type from its platform constant.
    pub fn from_ap_type(ap_type: i32) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|t| t.ap_type() == ap_type)
            .ok_or(ValidationError::UnknownSensorType(ap_type))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Accelerometer => "accelerometer",
            Self::MagneticField => "magnetic_field",
            Self::Gyroscope => "gyroscope",
            Self::Light => "light",
            Self::Pressure => "pressure",
            Self::Proximity => "proximity",
            Self::StepCounter => "step_counter",
        }
    }

    /// Static comparison settings for this sensor type.
    pub fn config(self) -> SensorTypeConfig {
        use ComparisonPolicy::{NearFarThreshold, NumericTolerance};
        let (expected_values_length, error_margin, comparison_policy) = match self {
            Self::Accelerometer => (3, 0.01, NumericTolerance),
            Self::Gyroscope => (3, 0.01, NumericTolerance),
            Self::MagneticField => (3, 0.05, NumericTolerance),
            Self::Pressure => (1, 0.05, NumericTolerance),
            Self::Light => (1, 0.07, NumericTolerance),
            Self::Proximity => (1, 0.01, NearFarThreshold),
            Self::StepCounter => (1, 0.0, NumericTolerance),
        };
        SensorTypeConfig {
            expected_values_length,
            error_margin,
            comparison_policy,
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SensorType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase().replace('-', "_");
        match lowered.as_str() {
            "accel" => return Ok(Self::Accelerometer),
            "gyro" => return Ok(Self::Gyroscope),
            "mag" => return Ok(Self::MagneticField),
            _ => {}
        }
        if let Some(t) = Self::ALL.into_iter().find(|t| t.name() == lowered) {
            return Ok(t);
        }
        match s.parse::<i32>() {
            Ok(code) => Self::from_ap_type(code),
            Err(_) => Err(ValidationError::Config(format!("unknown sensor name '{}'", s))),
        }
    }
}

/// How the two sides of an aligned pair are judged similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonPolicy {
    /// Every channel within an absolute error margin.
    NumericTolerance,
    /// Binary near/far agreement; the device reports 0 for near.
    NearFarThreshold,
}

/// Comparison settings for one sensor type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorTypeConfig {
    /// Number of float values carried by every datapoint.
    pub expected_values_length: usize,
    /// Allowed absolute difference per channel. Unused by near/far.
    pub error_margin: f32,
    pub comparison_policy: ComparisonPolicy,
}
