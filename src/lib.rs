//! xval core
//!
//! Cross-validates sensor data reported by an embedded subsystem (the device
//! under test) against data collected through the platform sensor APIs (the
//! reference), and computes signal-quality metrics over captured audio.
//!
//! # Pipeline
//!
//! 1. [`collector`] opens a collection window: one bounded channel per source,
//!    a single task owning both buffers, an immutable [`collector::Snapshot`]
//!    when the window closes.
//! 2. [`align::Aligner`] pairs samples by nearest timestamp within a skew bound.
//! 3. [`compare::Comparator`] checks every pair under the sensor type's policy.
//! 4. [`validator::CrossValidator`] ties the steps together and reports a verdict.
//!
//! [`signal`] is independent: DC offset, RMS, and peak dBFS over 16-bit PCM.

pub mod align;
pub mod cli;
pub mod collector;
pub mod compare;
pub mod config;
pub mod datapoint;
pub mod error;
pub mod sensor;
pub mod signal;
pub mod telemetry;
pub mod validator;

pub use align::{AlignedPair, Aligner, Alignment};
pub use compare::{Comparator, ComparisonReport, Mismatch};
pub use datapoint::{Datapoint, Source};
pub use error::ValidationError;
pub use sensor::{ComparisonPolicy, SensorType, SensorTypeConfig, SensorTypeMap};
pub use signal::{AudioThresholds, AudioVerdict, SignalMetrics};
pub use validator::{CrossValidator, RunOutcome, ValidatorConfig};
