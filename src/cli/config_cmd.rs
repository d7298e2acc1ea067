// Copyright 2024-2026 xval Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.

use crate::config::{self, EffectiveConfig, EnvConfig};

/// Print effective config as key-value pairs to stdout.
pub fn run_show(json: bool) {
    let cfg = config::load().effective_config();
    if json {
        match serde_json::to_string_pretty(&cfg) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to encode config: {}", e),
        }
    } else {
        print_config(&cfg);
    }
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    print_config(&EnvConfig::default().effective_config());
}

/// Check the effective configuration for combinations that cannot pass.
pub fn check(cfg: &EffectiveConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let interval_ns = cfg.default_sampling_interval_ms as i64 * 1_000_000;
    if cfg.max_skew_ns >= interval_ns {
        warnings.push(format!(
            "XVAL_MAX_SKEW_NS ({}) spans a whole sampling interval ({} ms); pairs may cross samples",
            cfg.max_skew_ns, cfg.default_sampling_interval_ms
        ));
    }
    if cfg.continuous_timeout_ms < cfg.default_sampling_interval_ms {
        warnings.push(format!(
            "XVAL_CONTINUOUS_TIMEOUT_MS ({}) < XVAL_DEFAULT_SAMPLING_INTERVAL_MS ({})",
            cfg.continuous_timeout_ms, cfg.default_sampling_interval_ms
        ));
    }
    if cfg.far_distance_cm == 0.0 {
        warnings.push("XVAL_FAR_DISTANCE_CM is 0; every proximity reading is far".to_string());
    }
    if cfg.audio_tolerance_db == 0.0 {
        warnings.push("XVAL_AUDIO_TOLERANCE_DB is 0; audio targets must match exactly".to_string());
    }
    warnings
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let warnings = check(&config::load().effective_config());
    if warnings.is_empty() {
        println!("Configuration is valid.");
        return 0;
    }
    for w in &warnings {
        eprintln!("WARNING: {}", w);
    }
    1
}

fn print_config(cfg: &EffectiveConfig) {
    println!("XVAL_MAX_SKEW_NS={}", cfg.max_skew_ns);
    println!("XVAL_FAR_DISTANCE_CM={}", cfg.far_distance_cm);
    println!("XVAL_DEFAULT_SAMPLING_INTERVAL_MS={}", cfg.default_sampling_interval_ms);
    println!("XVAL_CONTINUOUS_TIMEOUT_MS={}", cfg.continuous_timeout_ms);
    println!("XVAL_ON_CHANGE_TIMEOUT_MS={}", cfg.on_change_timeout_ms);
    println!("XVAL_INFO_TIMEOUT_MS={}", cfg.info_timeout_ms);
    println!("XVAL_CHANNEL_CAPACITY={}", cfg.channel_capacity);
    println!("XVAL_DC_OFFSET_LIMIT={}", cfg.dc_offset_limit);
    println!("XVAL_RMS_TARGET_DB={}", cfg.rms_target_db);
    println!("XVAL_PEAK_TARGET_DBFS={}", cfg.peak_target_dbfs);
    println!("XVAL_AUDIO_TOLERANCE_DB={}", cfg.audio_tolerance_db);
}
