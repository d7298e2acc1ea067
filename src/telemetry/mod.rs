//! Telemetry for validation runs.
//!
//! Structured logging through `tracing`, run spans, and counters/gauges
//! through the `metrics` facade. No exporter is installed here; the embedding
//! harness decides where metrics go.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    record_alignment, record_audio_metrics, record_late_samples, record_run_failure,
    record_run_success, record_samples_collected,
};
pub use spans::{RunSpan, SpanExt};
