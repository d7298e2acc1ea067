//! Per-pair similarity checks for aligned datapoints.

use crate::align::{AlignedPair, Alignment};
use crate::datapoint::Datapoint;
use crate::error::ValidationError;
use crate::sensor::{ComparisonPolicy, SensorTypeConfig};

/// Reference proximity readings below this distance count as near.
pub const DEFAULT_FAR_DISTANCE_CM: f32 = 5.0;

/// Value the device reports for a near proximity reading.
const DEVICE_NEAR_VALUE: f32 = 0.0;

/// A pair that failed comparison, kept for the failure report.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub index: usize,
    pub reference: Datapoint,
    pub device: Datapoint,
}

/// Every mismatching pair of one run.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub pairs: usize,
    pub mismatches: Vec<Mismatch>,
}

impl ComparisonReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn first_mismatch(&self) -> Option<&Mismatch> {
        self.mismatches.first()
    }

    /// Convert a failing report into `ComparisonMismatch`.
    pub fn into_result(self) -> Result<ComparisonReport, ValidationError> {
        match self.mismatches.first() {
            None => Ok(self),
            Some(first) => Err(ValidationError::ComparisonMismatch {
                first_index: first.index,
                mismatches: self.mismatches.len(),
                pairs: self.pairs,
            }),
        }
    }
}

/// Judges aligned pairs under one sensor type's policy.
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    config: SensorTypeConfig,
    near_threshold: f32,
}

impl Comparator {
    /// `max_range` is the reference sensor's maximum range; only near/far uses it.
    pub fn new(config: SensorTypeConfig, max_range: f32, far_distance_cm: f32) -> Self {
        Self {
            config,
            near_threshold: max_range.min(far_distance_cm),
        }
    }

    pub fn config(&self) -> &SensorTypeConfig {
        &self.config
    }

    /// Whether both sides of the pair agree on every channel.
    pub fn is_similar(&self, pair: &AlignedPair) -> Result<bool, ValidationError> {
        let (r, d) = (&pair.reference.values, &pair.device.values);
        if r.len() != d.len() {
            return Err(ValidationError::ComparatorContract {
                reference: r.len(),
                device: d.len(),
            });
        }
        let similar = match self.config.comparison_policy {
            ComparisonPolicy::NumericTolerance => r
                .iter()
                .zip(d)
                .all(|(a, b)| (a - b).abs() <= self.config.error_margin),
            ComparisonPolicy::NearFarThreshold => r
                .iter()
                .zip(d)
                .all(|(a, b)| (*a < self.near_threshold) == (*b == DEVICE_NEAR_VALUE)),
        };
        Ok(similar)
    }

    /// Check every pair, collecting all mismatches.
    ///
    /// When anything mismatches, the whole aligned sequence is dumped at
    /// debug level so the failure can be inspected after the fact.
    pub fn compare(&self, alignment: &Alignment) -> Result<ComparisonReport, ValidationError> {
        let mut mismatches = Vec::new();
        for (index, pair) in alignment.pairs.iter().enumerate() {
            if !self.is_similar(pair)? {
                mismatches.push(Mismatch {
                    index,
                    reference: pair.reference.clone(),
                    device: pair.device.clone(),
                });
            }
        }

        if let Some(first) = mismatches.first() {
            tracing::warn!(
                index = first.index,
                reference = %first.reference,
                device = %first.device,
                mismatches = mismatches.len(),
                "data points differ"
            );
            for (j, pair) in alignment.pairs.iter().enumerate() {
                tracing::debug!(index = j, reference = %pair.reference, device = %pair.device, "aligned pair");
            }
        }

        Ok(ComparisonReport {
            pairs: alignment.pairs.len(),
            mismatches,
        })
    }
}
