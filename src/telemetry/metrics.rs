//! Metric recording helpers over the `metrics` facade.

use metrics::{counter, gauge, histogram};

use crate::datapoint::Source;
use crate::signal::SignalMetrics;

fn source_label(source: Source) -> &'static str {
    match source {
        Source::Reference => "reference",
        Source::DeviceUnderTest => "device",
    }
}

/// A run that aligned and compared cleanly.
pub fn record_run_success(sensor: &'static str, pairs: usize) {
    counter!("xval_runs_total", "sensor" => sensor, "result" => "pass").increment(1);
    histogram!("xval_aligned_pairs", "sensor" => sensor).record(pairs as f64);
}

/// A run that ended in any `ValidationError`.
pub fn record_run_failure(sensor: &'static str, reason: &'static str) {
    counter!("xval_runs_total", "sensor" => sensor, "result" => "fail", "reason" => reason)
        .increment(1);
}

pub fn record_alignment(sensor: &'static str, match_ratio: f64, mismatches: usize) {
    gauge!("xval_match_ratio", "sensor" => sensor).set(match_ratio);
    histogram!("xval_mismatched_pairs", "sensor" => sensor).record(mismatches as f64);
}

pub fn record_samples_collected(source: Source, count: usize) {
    counter!("xval_samples_collected_total", "source" => source_label(source))
        .increment(count as u64);
}

/// Samples that arrived after the collection window closed.
pub fn record_late_samples(source: Source, count: usize) {
    counter!("xval_late_samples_total", "source" => source_label(source))
        .increment(count as u64);
}

pub fn record_audio_metrics(dc_offset: i64, metrics: &SignalMetrics) {
    gauge!("xval_audio_dc_offset").set(dc_offset as f64);
    gauge!("xval_audio_rms_db").set(metrics.rms_db);
    gauge!("xval_audio_peak_dbfs").set(metrics.peak_dbfs);
}
