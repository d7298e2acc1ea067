// Copyright 2024-2026 xval Contributors
// SPDX-License-Identifier: Apache-2.0

//! `audio`: microphone diagnostics over a raw little-endian 16-bit PCM capture.

use std::path::Path;

use super::{load_config, Options, EXIT_CONFIG, EXIT_FAIL, EXIT_PASS};
use crate::error::ValidationError;
use crate::signal::{decode_pcm_le, AudioCheckFailure, AudioThresholds, AudioVerdict};

const VALUED: &[&str] = &["--pcm", "--config"];
const FLAGS: &[&str] = &["--json"];

/// Decode a capture file and run the DC offset, RMS, and peak checks.
pub fn evaluate_file(path: &Path, thresholds: &AudioThresholds) -> Result<AudioVerdict, ValidationError> {
    let bytes = std::fs::read(path).map_err(|e| {
        ValidationError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    let samples = decode_pcm_le(&bytes)?;
    thresholds.evaluate(&samples)
}

fn describe(failure: &AudioCheckFailure) -> String {
    match failure {
        AudioCheckFailure::DcOffset { value, limit } => {
            format!("DC offset {} is not below {}", value, limit)
        }
        AudioCheckFailure::Rms { value_db, target_db } => {
            format!("RMS {:.2} dB is off target {:.2} dB", value_db, target_db)
        }
        AudioCheckFailure::Peak { value_dbfs, target_dbfs } => {
            format!("Peak amplitude {:.2} dB is off target {:.2} dB", value_dbfs, target_dbfs)
        }
    }
}

/// Run the audio command. Returns the process exit code.
pub fn run(args: &[String]) -> i32 {
    let opts = match Options::parse(args, VALUED, FLAGS) {
        Ok(o) => o,
        Err(msg) => {
            eprintln!("{}", msg);
            return EXIT_CONFIG;
        }
    };
    let cfg = match load_config(&opts) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Configuration error: {}", msg);
            return EXIT_CONFIG;
        }
    };
    let path = match opts.require("--pcm") {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{}", msg);
            return EXIT_CONFIG;
        }
    };

    let verdict = match evaluate_file(Path::new(path), &cfg.audio) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Audio diagnostics failed: {}", e);
            return if e.is_data_failure() { EXIT_FAIL } else { EXIT_CONFIG };
        }
    };

    if opts.flag("--json") {
        match serde_json::to_string_pretty(&verdict) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to encode verdict: {}", e),
        }
    } else {
        println!("DC Offset: {}", verdict.dc_offset);
        println!("RMS: {:.3} dB", verdict.metrics.rms_db.abs());
        println!("Peak Amplitude: {:.3} dB", verdict.metrics.peak_dbfs.abs());
        for failure in &verdict.failures {
            println!("FAIL: {}", describe(failure));
        }
    }

    if verdict.passed() {
        EXIT_PASS
    } else {
        EXIT_FAIL
    }
}
