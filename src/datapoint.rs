//! Timestamped vector samples from either side of a cross-validation run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the run produced a datapoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Platform sensor APIs, treated as ground truth.
    Reference,
    /// The embedded subsystem being validated.
    DeviceUnderTest,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => f.write_str("reference"),
            Self::DeviceUnderTest => f.write_str("device"),
        }
    }
}

/// A single sample: nanosecond timestamp plus one value per channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datapoint {
    pub timestamp: i64,
    pub values: Vec<f32>,
    pub source: Source,
}

/// On-disk form of a datapoint. Files carry one side each, so the source
/// comes from the caller rather than the file.
#[derive(Deserialize)]
struct RecordedDatapoint {
    timestamp: i64,
    values: Vec<f32>,
}

/// Parse a JSON array of `{"timestamp": <ns>, "values": [..]}` and tag
/// every sample with `source`.
pub fn parse_datapoints(json: &str, source: Source) -> Result<Vec<Datapoint>, serde_json::Error> {
    let recorded: Vec<RecordedDatapoint> = serde_json::from_str(json)?;
    Ok(recorded
        .into_iter()
        .map(|r| Datapoint::new(source, r.timestamp, r.values))
        .collect())
}

impl Datapoint {
    pub fn new(source: Source, timestamp: i64, values: Vec<f32>) -> Self {
        Self { timestamp, values, source }
    }

    pub fn reference(timestamp: i64, values: Vec<f32>) -> Self {
        Self::new(Source::Reference, timestamp, values)
    }

    pub fn device(timestamp: i64, values: Vec<f32>) -> Self {
        Self::new(Source::DeviceUnderTest, timestamp, values)
    }

    /// Number of channels carried by this sample.
    pub fn channels(&self) -> usize {
        self.values.len()
    }
}

impl fmt::Display for Datapoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ timestamp: {}, values: {:?} }}", self.source, self.timestamp, self.values)
    }
}
