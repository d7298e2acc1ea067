//! Span utilities for validation runs.

use tracing::{info_span, Span};

/// Extension trait for recording an outcome into a span.
pub trait SpanExt {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for the span that wraps one sensor's validation run.
pub struct RunSpan;

impl RunSpan {
    /// Fields:
    /// - `run_id`: unique per run, for correlating collector and validator logs
    /// - `sensor`: sensor type name
    /// - `status`, `error.message`: filled by `SpanExt::record_result`
    /// - `pairs`, `match_ratio`: filled after alignment
    pub fn new(run_id: &str, sensor: &str) -> Span {
        info_span!(
            "validation_run",
            run_id = %run_id,
            sensor = %sensor,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            pairs = tracing::field::Empty,
            match_ratio = tracing::field::Empty,
        )
    }
}
