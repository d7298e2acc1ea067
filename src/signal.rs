//! Signal-quality metrics over a block of signed 16-bit PCM samples.
//!
//! All metrics are a single full-block computation: no windowing, no filtering.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Largest positive signed 16-bit magnitude; full scale for dBFS.
pub const MAX_SIGNED_SHORT: f64 = 32767.0;

/// RMS and peak results for one capture block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalMetrics {
    pub rms_linear: f64,
    pub rms_db: f64,
    pub peak_dbfs: f64,
}

fn ensure_samples(samples: &[i16]) -> Result<(), ValidationError> {
    if samples.is_empty() {
        return Err(ValidationError::DegenerateMetric("empty sample block".into()));
    }
    Ok(())
}

/// Integer mean of the raw samples, truncated toward zero.
pub fn dc_offset(samples: &[i16]) -> Result<i64, ValidationError> {
    ensure_samples(samples)?;
    let sum: i64 = samples.iter().map(|&s| i64::from(s)).sum();
    Ok(sum / samples.len() as i64)
}

/// Linear RMS of the samples scaled into [-1, 1].
pub fn rms_linear(samples: &[i16]) -> Result<f64, ValidationError> {
    ensure_samples(samples)?;
    let sum_of_squares: f64 = samples
        .iter()
        .map(|&s| {
            let scaled = f64::from(s) / MAX_SIGNED_SHORT;
            scaled * scaled
        })
        .sum();
    Ok((sum_of_squares / samples.len() as f64).sqrt())
}

/// Peak absolute sample relative to full scale, in dBFS.
pub fn peak_dbfs(samples: &[i16]) -> Result<f64, ValidationError> {
    ensure_samples(samples)?;
    let peak = samples.iter().map(|&s| i32::from(s).abs()).max().unwrap_or(0);
    if peak == 0 {
        return Err(ValidationError::DegenerateMetric("peak amplitude is zero".into()));
    }
    Ok(20.0 * (f64::from(peak) / MAX_SIGNED_SHORT).log10())
}

impl SignalMetrics {
    /// Compute RMS (linear and dB) and peak dBFS.
    ///
    /// A silent block is rejected rather than reported as negative infinity.
    pub fn compute(samples: &[i16]) -> Result<Self, ValidationError> {
        let rms_linear = rms_linear(samples)?;
        if rms_linear == 0.0 {
            return Err(ValidationError::DegenerateMetric("RMS is zero".into()));
        }
        let rms_db = 20.0 * rms_linear.abs().log10();
        let peak_dbfs = peak_dbfs(samples)?;
        Ok(Self { rms_linear, rms_db, peak_dbfs })
    }
}

/// Decode a little-endian byte buffer into 16-bit samples.
pub fn decode_pcm_le(bytes: &[u8]) -> Result<Vec<i16>, ValidationError> {
    if bytes.len() % 2 != 0 {
        return Err(ValidationError::InvalidPcm(format!(
            "odd byte length {}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect())
}

/// Acceptance limits for the microphone diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioThresholds {
    /// DC offset must stay strictly below this.
    pub dc_offset_limit: i64,
    pub rms_target_db: f64,
    pub peak_target_dbfs: f64,
    /// Allowed distance from each dB target.
    pub tolerance_db: f64,
}

impl Default for AudioThresholds {
    fn default() -> Self {
        Self {
            dc_offset_limit: 15,
            rms_target_db: 22.0,
            peak_target_dbfs: 19.5,
            tolerance_db: 3.0,
        }
    }
}

/// A single failed audio check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum AudioCheckFailure {
    DcOffset { value: i64, limit: i64 },
    Rms { value_db: f64, target_db: f64 },
    Peak { value_dbfs: f64, target_dbfs: f64 },
}

/// Outcome of the audio diagnostics for one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioVerdict {
    pub dc_offset: i64,
    pub metrics: SignalMetrics,
    pub failures: Vec<AudioCheckFailure>,
}

impl AudioVerdict {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

impl AudioThresholds {
    /// Run the DC offset, RMS, and peak checks. dB values are compared by magnitude.
    pub fn evaluate(&self, samples: &[i16]) -> Result<AudioVerdict, ValidationError> {
        let dc_offset = dc_offset(samples)?;
        let metrics = SignalMetrics::compute(samples)?;
        let mut failures = Vec::new();

        if dc_offset >= self.dc_offset_limit {
            failures.push(AudioCheckFailure::DcOffset {
                value: dc_offset,
                limit: self.dc_offset_limit,
            });
        }
        let rms_db = metrics.rms_db.abs();
        if (rms_db - self.rms_target_db).abs() > self.tolerance_db {
            failures.push(AudioCheckFailure::Rms {
                value_db: rms_db,
                target_db: self.rms_target_db,
            });
        }
        let peak = metrics.peak_dbfs.abs();
        if (peak - self.peak_target_dbfs).abs() > self.tolerance_db {
            failures.push(AudioCheckFailure::Peak {
                value_dbfs: peak,
                target_dbfs: self.peak_target_dbfs,
            });
        }

        tracing::info!(
            dc_offset,
            rms_db = metrics.rms_db,
            peak_dbfs = metrics.peak_dbfs,
            failed_checks = failures.len(),
            "audio diagnostics evaluated"
        );
        crate::telemetry::record_audio_metrics(dc_offset, &metrics);
        Ok(AudioVerdict { dc_offset, metrics, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_block_is_degenerate() {
        assert!(matches!(dc_offset(&[]), Err(ValidationError::DegenerateMetric(_))));
        assert!(matches!(SignalMetrics::compute(&[]), Err(ValidationError::DegenerateMetric(_))));
    }

    #[test]
    fn test_silence_has_zero_dc_and_no_rms_db() {
        let zeros = [0i16; 64];
        assert_eq!(dc_offset(&zeros).unwrap(), 0);
        assert_eq!(rms_linear(&zeros).unwrap(), 0.0);
        assert!(matches!(SignalMetrics::compute(&zeros), Err(ValidationError::DegenerateMetric(_))));
    }

    #[test]
    fn test_dc_offset_truncates_toward_zero() {
        assert_eq!(dc_offset(&[1, 2]).unwrap(), 1);
        assert_eq!(dc_offset(&[-1, -2]).unwrap(), -1);
        assert_eq!(dc_offset(&[i16::MIN, i16::MIN]).unwrap(), -32768);
    }

    #[test]
    fn test_full_scale_square_wave() {
        let block: Vec<i16> = (0..100).map(|i| if i % 2 == 0 { 32767 } else { -32767 }).collect();
        let m = SignalMetrics::compute(&block).unwrap();
        assert!((m.rms_linear - 1.0).abs() < 1e-12);
        assert!(m.rms_db.abs() < 1e-9);
        assert!(m.peak_dbfs.abs() < 1e-9);
    }

    #[test]
    fn test_half_scale_is_about_minus_six_db() {
        let block = [16384i16; 10];
        let m = SignalMetrics::compute(&block).unwrap();
        assert!((m.peak_dbfs + 6.02).abs() < 0.01, "{}", m.peak_dbfs);
        assert!((m.rms_db - m.peak_dbfs).abs() < 1e-9);
    }

    #[test]
    fn test_decode_pcm_little_endian() {
        let samples = decode_pcm_le(&[0x01, 0x00, 0xff, 0xff, 0x00, 0x80]).unwrap();
        assert_eq!(samples, vec![1, -1, i16::MIN]);
        assert!(matches!(decode_pcm_le(&[0x00]), Err(ValidationError::InvalidPcm(_))));
    }

    #[test]
    fn test_thresholds_flag_dc_bias() {
        let thresholds = AudioThresholds {
            dc_offset_limit: 15,
            rms_target_db: 0.0,
            peak_target_dbfs: 0.0,
            tolerance_db: 100.0,
        };
        let biased = [100i16; 32];
        let verdict = thresholds.evaluate(&biased).unwrap();
        assert!(!verdict.passed());
        assert_eq!(verdict.failures, vec![AudioCheckFailure::DcOffset { value: 100, limit: 15 }]);
    }
}
