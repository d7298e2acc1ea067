//! Sensor types, their comparison settings, and the AP/CHRE type mapping.

mod config;
mod descriptor;
mod roster;
pub mod type_map;

pub use config::{ComparisonPolicy, SensorType, SensorTypeConfig};
pub use descriptor::{CollectionTimings, ReportingMode, SensorDescriptor};
pub use roster::{await_sensor_info, RosterDecision, SensorInfo, SensorRoster, SkipReason};
pub use type_map::SensorTypeMap;
