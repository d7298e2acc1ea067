//! Timestamp alignment of reference and device-under-test sequences.
//!
//! Both inputs must already be sorted ascending by timestamp. Matching is a
//! greedy two-pointer merge: a pair is emitted when the timestamps differ by
//! strictly less than the skew bound, otherwise the earlier sample is dropped.

use crate::datapoint::Datapoint;
use crate::error::ValidationError;

/// Default skew bound between matched samples: 4 ms.
pub const DEFAULT_MAX_SKEW_NS: i64 = 4_000_000;

/// One reference sample and the device sample matched to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub reference: Datapoint,
    pub device: Datapoint,
}

impl AlignedPair {
    /// Absolute timestamp difference in nanoseconds.
    pub fn skew_ns(&self) -> i64 {
        let diff = self.reference.timestamp.abs_diff(self.device.timestamp);
        i64::try_from(diff).unwrap_or(i64::MAX)
    }
}

/// Result of aligning two sequences.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub pairs: Vec<AlignedPair>,
    pub reference_len: usize,
    pub device_len: usize,
}

impl Alignment {
    /// Paired samples over the shorter input's length. 0.0 when either input is empty.
    pub fn match_ratio(&self) -> f64 {
        let shorter = self.reference_len.min(self.device_len);
        if shorter == 0 {
            return 0.0;
        }
        self.pairs.len() as f64 / shorter as f64
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// Greedy nearest-timestamp aligner.
#[derive(Debug, Clone, Copy)]
pub struct Aligner {
    max_skew_ns: i64,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SKEW_NS)
    }
}

impl Aligner {
    pub fn new(max_skew_ns: i64) -> Self {
        Self { max_skew_ns: max_skew_ns.max(0) }
    }

    pub fn max_skew_ns(&self) -> i64 {
        self.max_skew_ns
    }

    fn timestamps_match(&self, a: &Datapoint, b: &Datapoint) -> bool {
        a.timestamp.abs_diff(b.timestamp) < self.max_skew_ns as u64
    }

    /// Pair up samples without judging the result. Never fails.
    pub fn pair(&self, reference: &[Datapoint], device: &[Datapoint]) -> Alignment {
        let mut pairs = Vec::with_capacity(reference.len().min(device.len()));
        let (mut i, mut j) = (0, 0);
        while i < reference.len() && j < device.len() {
            let (r, d) = (&reference[i], &device[j]);
            if self.timestamps_match(r, d) {
                pairs.push(AlignedPair { reference: r.clone(), device: d.clone() });
                i += 1;
                j += 1;
            } else if r.timestamp < d.timestamp {
                i += 1;
            } else {
                j += 1;
            }
        }
        Alignment {
            pairs,
            reference_len: reference.len(),
            device_len: device.len(),
        }
    }

    /// Pair up samples and fail the run when nothing matched.
    ///
    /// On failure both raw sequences are dumped at debug level.
    pub fn align(
        &self,
        reference: &[Datapoint],
        device: &[Datapoint],
    ) -> Result<Alignment, ValidationError> {
        let alignment = self.pair(reference, device);
        if alignment.is_empty() {
            for (i, dp) in reference.iter().enumerate() {
                tracing::debug!(index = i, datapoint = %dp, "unaligned reference sample");
            }
            for (i, dp) in device.iter().enumerate() {
                tracing::debug!(index = i, datapoint = %dp, "unaligned device sample");
            }
            return Err(ValidationError::AlignmentFailure {
                reference: reference.len(),
                device: device.len(),
            });
        }
        tracing::debug!(
            pairs = alignment.len(),
            match_ratio = alignment.match_ratio(),
            "aligned reference and device samples"
        );
        Ok(alignment)
    }
}
