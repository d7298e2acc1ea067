//! One cross-validation run: snapshot in, verdict out.

use tracing::Instrument;
use uuid::Uuid;

use crate::align::{Aligner, DEFAULT_MAX_SKEW_NS};
use crate::collector::{CollectionHandle, Snapshot};
use crate::compare::{Comparator, ComparisonReport, DEFAULT_FAR_DISTANCE_CM};
use crate::datapoint::{Datapoint, Source};
use crate::error::ValidationError;
use crate::sensor::{SensorDescriptor, SensorType};
use crate::telemetry::{self, RunSpan, SpanExt};

/// Settings shared by every run.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub max_skew_ns: i64,
    pub far_distance_cm: f32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_skew_ns: DEFAULT_MAX_SKEW_NS,
            far_distance_cm: DEFAULT_FAR_DISTANCE_CM,
        }
    }
}

/// A passing run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub sensor: SensorType,
    pub pairs: usize,
    pub match_ratio: f64,
    pub late_samples: usize,
    pub report: ComparisonReport,
}

/// Aligns and compares collected data for one sensor at a time.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    aligner: Aligner,
    far_distance_cm: f32,
}

impl Default for CrossValidator {
    fn default() -> Self {
        Self::new(&ValidatorConfig::default())
    }
}

fn failure_reason(error: &ValidationError) -> &'static str {
    match error {
        ValidationError::NoData(_) => "no_data",
        ValidationError::AlignmentFailure { .. } => "alignment",
        ValidationError::ComparisonMismatch { .. } => "mismatch",
        e if e.is_configuration() => "configuration",
        _ => "other",
    }
}

fn check_lengths(source: Source, data: &[Datapoint], expected: usize) -> Result<(), ValidationError> {
    match data.iter().find(|dp| dp.values.len() != expected) {
        Some(dp) => Err(ValidationError::ValuesLength {
            origin: source,
            expected,
            actual: dp.values.len(),
        }),
        None => Ok(()),
    }
}

impl CrossValidator {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            aligner: Aligner::new(config.max_skew_ns),
            far_distance_cm: config.far_distance_cm,
        }
    }

    /// Validate a closed collection window.
    pub fn validate(
        &self,
        snapshot: &Snapshot,
        max_range: f32,
    ) -> Result<RunOutcome, ValidationError> {
        let mut outcome =
            self.validate_sequences(snapshot.sensor, &snapshot.reference, &snapshot.device, max_range)?;
        outcome.late_samples = snapshot.late_samples;
        Ok(outcome)
    }

    /// Validate two already-collected sequences for `sensor`.
    pub fn validate_sequences(
        &self,
        sensor: SensorType,
        reference: &[Datapoint],
        device: &[Datapoint],
        max_range: f32,
    ) -> Result<RunOutcome, ValidationError> {
        let run_id = Uuid::new_v4();
        let span = RunSpan::new(&run_id.to_string(), sensor.name());
        let _entered = span.enter();

        let result = self.run(run_id, sensor, reference, device, max_range);
        span.record_result(&result);
        match &result {
            Ok(outcome) => {
                span.record("pairs", outcome.pairs);
                span.record("match_ratio", outcome.match_ratio);
                telemetry::record_run_success(sensor.name(), outcome.pairs);
                tracing::info!(pairs = outcome.pairs, match_ratio = outcome.match_ratio, "validation passed");
            }
            Err(e) => {
                telemetry::record_run_failure(sensor.name(), failure_reason(e));
                tracing::error!(error = %e, "validation failed");
            }
        }
        result
    }

    fn run(
        &self,
        run_id: Uuid,
        sensor: SensorType,
        reference: &[Datapoint],
        device: &[Datapoint],
        max_range: f32,
    ) -> Result<RunOutcome, ValidationError> {
        if device.is_empty() {
            return Err(ValidationError::NoData(Source::DeviceUnderTest));
        }
        if reference.is_empty() {
            return Err(ValidationError::NoData(Source::Reference));
        }
        let config = sensor.config();
        check_lengths(Source::Reference, reference, config.expected_values_length)?;
        check_lengths(Source::DeviceUnderTest, device, config.expected_values_length)?;

        let alignment = self.aligner.align(reference, device)?;
        let comparator = Comparator::new(config, max_range, self.far_distance_cm);
        let report = comparator.compare(&alignment)?;
        telemetry::record_alignment(sensor.name(), alignment.match_ratio(), report.mismatches.len());
        let report = report.into_result()?;

        Ok(RunOutcome {
            run_id,
            sensor,
            pairs: alignment.len(),
            match_ratio: alignment.match_ratio(),
            late_samples: 0,
            report,
        })
    }

    /// Wait for a collection window to close, then validate its snapshot.
    pub async fn finish_and_validate(
        &self,
        handle: CollectionHandle,
        sensor: &SensorDescriptor,
    ) -> Result<RunOutcome, ValidationError> {
        let span = tracing::info_span!("collection", sensor = %sensor.name);
        let snapshot = handle.finish().instrument(span).await?;
        snapshot.ensure_non_empty()?;
        self.validate(&snapshot, sensor.max_range)
    }
}
