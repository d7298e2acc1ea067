//! Harness configuration from `XVAL_*` environment variables and an optional TOML file.
//!
//! Values come from, in increasing precedence: built-in defaults, the TOML
//! file (when given), then environment variables. Missing or invalid
//! environment values keep the lower-precedence value without failing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `XVAL_MAX_SKEW_NS` | 4000000 | Max timestamp skew for a matched pair (ns) |
//! | `XVAL_FAR_DISTANCE_CM` | 5.0 | Proximity near/far threshold (cm) |
//! | `XVAL_DEFAULT_SAMPLING_INTERVAL_MS` | 20 | Requested sampling interval (ms) |
//! | `XVAL_CONTINUOUS_TIMEOUT_MS` | 5000 | Window length for continuous sensors (ms) |
//! | `XVAL_ON_CHANGE_TIMEOUT_MS` | 1000 | Window length for other sensors (ms) |
//! | `XVAL_INFO_TIMEOUT_MS` | 1000 | Wait for the device's sensor info (ms) |
//! | `XVAL_CHANNEL_CAPACITY` | 1024 | Per-source channel capacity |
//! | `XVAL_DC_OFFSET_LIMIT` | 15 | Audio DC offset limit |
//! | `XVAL_RMS_TARGET_DB` | 22.0 | Audio RMS target (dB magnitude) |
//! | `XVAL_PEAK_TARGET_DBFS` | 19.5 | Audio peak target (dBFS magnitude) |
//! | `XVAL_AUDIO_TOLERANCE_DB` | 3.0 | Allowed distance from audio targets (dB) |
//! | `XVAL_LOG_FORMAT` | compact | `json` or `compact` |
//! | `XVAL_LOG` | info | Log filter directive |

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collector::DEFAULT_CHANNEL_CAPACITY;
use crate::error::ValidationError;
use crate::sensor::CollectionTimings;
use crate::signal::AudioThresholds;
use crate::telemetry::{LogConfig, LogFormat};
use crate::validator::ValidatorConfig;

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub max_skew_ns: i64,
    pub far_distance_cm: f32,
    pub default_sampling_interval_ms: u64,
    pub continuous_timeout_ms: u64,
    pub on_change_timeout_ms: u64,
    pub info_timeout_ms: u64,
    pub channel_capacity: usize,
    pub dc_offset_limit: i64,
    pub rms_target_db: f64,
    pub peak_target_dbfs: f64,
    pub audio_tolerance_db: f64,
}

/// All harness configuration.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub validator: ValidatorConfig,
    pub timings: CollectionTimings,
    pub info_timeout: Duration,
    pub channel_capacity: usize,
    pub audio: AudioThresholds,
    pub log: LogConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            validator: ValidatorConfig::default(),
            timings: CollectionTimings::default(),
            info_timeout: Duration::from_millis(1000),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            audio: AudioThresholds::default(),
            log: LogConfig::default(),
        }
    }
}

/// On-disk form; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub max_skew_ns: Option<i64>,
    pub far_distance_cm: Option<f32>,
    pub default_sampling_interval_ms: Option<u64>,
    pub continuous_timeout_ms: Option<u64>,
    pub on_change_timeout_ms: Option<u64>,
    pub info_timeout_ms: Option<u64>,
    pub channel_capacity: Option<usize>,
    pub audio: Option<AudioFileConfig>,
    pub log: Option<LogFileConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioFileConfig {
    pub dc_offset_limit: Option<i64>,
    pub rms_target_db: Option<f64>,
    pub peak_target_dbfs: Option<f64>,
    pub tolerance_db: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogFileConfig {
    pub format: Option<String>,
    pub level: Option<String>,
}

/// Parse an env var, returning `default` on missing or invalid.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

/// Floors and clamps applied after every layer.
fn sanitize(mut cfg: EnvConfig) -> EnvConfig {
    cfg.validator.max_skew_ns = cfg.validator.max_skew_ns.max(1);
    if !cfg.validator.far_distance_cm.is_finite() || cfg.validator.far_distance_cm < 0.0 {
        cfg.validator.far_distance_cm = crate::compare::DEFAULT_FAR_DISTANCE_CM;
    }
    cfg.timings.default_sampling_interval =
        cfg.timings.default_sampling_interval.max(Duration::from_millis(1));
    cfg.timings.continuous_timeout = cfg.timings.continuous_timeout.max(Duration::from_millis(1));
    cfg.timings.on_change_timeout = cfg.timings.on_change_timeout.max(Duration::from_millis(1));
    cfg.info_timeout = cfg.info_timeout.max(Duration::from_millis(1));
    cfg.channel_capacity = cfg.channel_capacity.max(1);
    cfg.audio.tolerance_db = cfg.audio.tolerance_db.abs();
    cfg
}

/// Apply environment overrides on top of `base`.
fn apply_env(base: EnvConfig) -> EnvConfig {
    let mut cfg = base;
    cfg.validator.max_skew_ns = parse_env("XVAL_MAX_SKEW_NS", cfg.validator.max_skew_ns);
    cfg.validator.far_distance_cm = parse_env("XVAL_FAR_DISTANCE_CM", cfg.validator.far_distance_cm);
    cfg.timings.default_sampling_interval = Duration::from_millis(parse_env(
        "XVAL_DEFAULT_SAMPLING_INTERVAL_MS",
        millis(cfg.timings.default_sampling_interval),
    ));
    cfg.timings.continuous_timeout = Duration::from_millis(parse_env(
        "XVAL_CONTINUOUS_TIMEOUT_MS",
        millis(cfg.timings.continuous_timeout),
    ));
    cfg.timings.on_change_timeout = Duration::from_millis(parse_env(
        "XVAL_ON_CHANGE_TIMEOUT_MS",
        millis(cfg.timings.on_change_timeout),
    ));
    cfg.info_timeout =
        Duration::from_millis(parse_env("XVAL_INFO_TIMEOUT_MS", millis(cfg.info_timeout)));
    cfg.channel_capacity = parse_env("XVAL_CHANNEL_CAPACITY", cfg.channel_capacity);
    cfg.audio.dc_offset_limit = parse_env("XVAL_DC_OFFSET_LIMIT", cfg.audio.dc_offset_limit);
    cfg.audio.rms_target_db = parse_env("XVAL_RMS_TARGET_DB", cfg.audio.rms_target_db);
    cfg.audio.peak_target_dbfs = parse_env("XVAL_PEAK_TARGET_DBFS", cfg.audio.peak_target_dbfs);
    cfg.audio.tolerance_db = parse_env("XVAL_AUDIO_TOLERANCE_DB", cfg.audio.tolerance_db);
    cfg.log.format = parse_env::<LogFormat>("XVAL_LOG_FORMAT", cfg.log.format);
    if let Ok(level) = std::env::var("XVAL_LOG") {
        if !level.trim().is_empty() {
            cfg.log.level = level;
        }
    }
    sanitize(cfg)
}

/// Load all configuration from environment variables.
pub fn load() -> EnvConfig {
    apply_env(EnvConfig::default())
}

/// Parse a TOML document into a config layered over the defaults (no env).
pub fn from_toml_str(text: &str) -> Result<EnvConfig, ValidationError> {
    let file: FileConfig =
        toml::from_str(text).map_err(|e| ValidationError::Config(e.to_string()))?;
    let mut cfg = EnvConfig::default();
    if let Some(v) = file.max_skew_ns {
        cfg.validator.max_skew_ns = v;
    }
    if let Some(v) = file.far_distance_cm {
        cfg.validator.far_distance_cm = v;
    }
    if let Some(v) = file.default_sampling_interval_ms {
        cfg.timings.default_sampling_interval = Duration::from_millis(v);
    }
    if let Some(v) = file.continuous_timeout_ms {
        cfg.timings.continuous_timeout = Duration::from_millis(v);
    }
    if let Some(v) = file.on_change_timeout_ms {
        cfg.timings.on_change_timeout = Duration::from_millis(v);
    }
    if let Some(v) = file.info_timeout_ms {
        cfg.info_timeout = Duration::from_millis(v);
    }
    if let Some(v) = file.channel_capacity {
        cfg.channel_capacity = v;
    }
    if let Some(audio) = file.audio {
        cfg.audio.dc_offset_limit = audio.dc_offset_limit.unwrap_or(cfg.audio.dc_offset_limit);
        cfg.audio.rms_target_db = audio.rms_target_db.unwrap_or(cfg.audio.rms_target_db);
        cfg.audio.peak_target_dbfs = audio.peak_target_dbfs.unwrap_or(cfg.audio.peak_target_dbfs);
        cfg.audio.tolerance_db = audio.tolerance_db.unwrap_or(cfg.audio.tolerance_db);
    }
    if let Some(log) = file.log {
        if let Some(format) = log.format {
            cfg.log.format = format
                .parse()
                .map_err(|e: crate::telemetry::LogError| ValidationError::Config(e.to_string()))?;
        }
        if let Some(level) = log.level {
            cfg.log.level = level;
        }
    }
    Ok(sanitize(cfg))
}

/// Load a TOML file, then apply environment overrides.
pub fn load_file(path: &Path) -> Result<EnvConfig, ValidationError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ValidationError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    Ok(apply_env(from_toml_str(&text)?))
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            max_skew_ns: self.validator.max_skew_ns,
            far_distance_cm: self.validator.far_distance_cm,
            default_sampling_interval_ms: millis(self.timings.default_sampling_interval),
            continuous_timeout_ms: millis(self.timings.continuous_timeout),
            on_change_timeout_ms: millis(self.timings.on_change_timeout),
            info_timeout_ms: millis(self.info_timeout),
            channel_capacity: self.channel_capacity,
            dc_offset_limit: self.audio.dc_offset_limit,
            rms_target_db: self.audio.rms_target_db,
            peak_target_dbfs: self.audio.peak_target_dbfs,
            audio_tolerance_db: self.audio.tolerance_db,
        }
    }
}
