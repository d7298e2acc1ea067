//! Platform sensor descriptors and the per-sensor run parameters derived from them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::SensorType;

/// How a platform sensor delivers events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingMode {
    #[default]
    Continuous,
    OnChange,
    OneShot,
    SpecialTrigger,
}

/// A platform sensor as enumerated by the reference side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub name: String,
    pub sensor_type: SensorType,
    #[serde(default)]
    pub reporting_mode: ReportingMode,
    /// Minimum delay between events in microseconds.
    #[serde(default)]
    pub min_delay_us: u64,
    /// Maximum delay between events in microseconds.
    #[serde(default = "default_max_delay_us")]
    pub max_delay_us: u64,
    /// Maximum range in the sensor's unit (cm for proximity).
    #[serde(default = "default_max_range")]
    pub max_range: f32,
}

fn default_max_delay_us() -> u64 {
    1_000_000
}

fn default_max_range() -> f32 {
    f32::MAX
}

/// Timing knobs that shape one collection window.
#[derive(Debug, Clone)]
pub struct CollectionTimings {
    pub default_sampling_interval: Duration,
    pub continuous_timeout: Duration,
    pub on_change_timeout: Duration,
}

impl Default for CollectionTimings {
    fn default() -> Self {
        Self {
            default_sampling_interval: Duration::from_millis(20),
            continuous_timeout: Duration::from_millis(5000),
            on_change_timeout: Duration::from_millis(1000),
        }
    }
}

impl SensorDescriptor {
    pub fn new(name: impl Into<String>, sensor_type: SensorType) -> Self {
        Self {
            name: name.into(),
            sensor_type,
            reporting_mode: ReportingMode::default(),
            min_delay_us: 0,
            max_delay_us: default_max_delay_us(),
            max_range: default_max_range(),
        }
    }

    /// Sampling interval: the default, raised to the sensor's minimum delay
    /// and then capped at its maximum delay (millisecond resolution).
    pub fn sampling_interval(&self, timings: &CollectionTimings) -> Duration {
        let default_ms = timings.default_sampling_interval.as_millis() as u64;
        let min_ms = self.min_delay_us / 1000;
        let max_ms = self.max_delay_us / 1000;
        Duration::from_millis(default_ms.max(min_ms).min(max_ms))
    }

    /// How long to hold the collection window open.
    pub fn await_timeout(&self, timings: &CollectionTimings) -> Duration {
        if self.is_continuous() {
            timings.continuous_timeout
        } else {
            timings.on_change_timeout
        }
    }

    pub fn is_continuous(&self) -> bool {
        self.reporting_mode == ReportingMode::Continuous
    }
}
