//! Validation error types.
//!
//! All errors are fail-closed: a run that hits any of them is a failed run.
//! Whether a failure is retried or the sensor skipped is decided by the caller.

use thiserror::Error;

use crate::datapoint::Source;

/// Errors that can end a validation run or a signal-metric evaluation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Sensor type {0} is not recognized")]
    UnknownSensorType(i32),

    #[error("Incorrect {origin} datapoint values length {actual} when expecting {expected}")]
    ValuesLength {
        origin: Source,
        expected: usize,
        actual: usize,
    },

    #[error("Incorrect sensor type {actual} when expecting {expected}")]
    SensorTypeMismatch { expected: i32, actual: i32 },

    #[error("Did not find any {0} datapoints")]
    NoData(Source),

    #[error(
        "Did not find matching timestamps to align reference and device datapoints \
         ({reference} reference, {device} device samples)"
    )]
    AlignmentFailure { reference: usize, device: usize },

    #[error("Data points differ on index {first_index} ({mismatches} of {pairs} pairs mismatched)")]
    ComparisonMismatch {
        first_index: usize,
        mismatches: usize,
        pairs: usize,
    },

    #[error("Aligned pair has unequal values lengths: reference {reference}, device {device}")]
    ComparatorContract { reference: usize, device: usize },

    #[error("Degenerate signal metric: {0}")]
    DegenerateMetric(String),

    #[error("Invalid PCM buffer: {0}")]
    InvalidPcm(String),

    #[error("Invalid sensor type map: {0}")]
    InvalidTypeMap(String),

    #[error("Timed out after {0}ms waiting for sensor info")]
    InfoTimeout(u64),

    #[error("Collector error: {0}")]
    Collector(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ValidationError {
    /// Returns true for contract violations rather than data problems.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownSensorType(_)
                | Self::ValuesLength { .. }
                | Self::SensorTypeMismatch { .. }
                | Self::ComparatorContract { .. }
                | Self::InvalidTypeMap(_)
                | Self::Config(_)
        )
    }

    /// Returns true if the collected data itself failed validation.
    pub fn is_data_failure(&self) -> bool {
        matches!(
            self,
            Self::NoData(_)
                | Self::AlignmentFailure { .. }
                | Self::ComparisonMismatch { .. }
                | Self::DegenerateMetric(_)
        )
    }
}
