// Copyright 2024-2026 xval Contributors
// SPDX-License-Identifier: Apache-2.0

//! xval entry point.
//!
//! ## CLI Subcommands
//!
//! - `xval validate` - Cross-validate recorded reference and device datapoints
//! - `xval audio` - Microphone diagnostics over a PCM capture
//! - `xval config` - Show, list defaults, or validate configuration

use std::process::ExitCode;

use xval_core::cli::{audio_cmd, config_cmd, validate_cmd};
use xval_core::config as xval_config;
use xval_core::telemetry;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");
    let rest = args.get(2..).unwrap_or(&[]);

    if matches!(command, "validate" | "audio") {
        let log = xval_config::load().log;
        if let Err(e) = telemetry::init_logging(&log) {
            eprintln!("Logging disabled: {}", e);
        }
    }

    match command {
        "validate" => ExitCode::from(validate_cmd::run(rest) as u8),
        "audio" => ExitCode::from(audio_cmd::run(rest) as u8),
        "config" => {
            let subcommand = rest.first().map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let json = rest.get(1).map(|s| s.as_str()) == Some("--json");
                    config_cmd::run_show(json);
                    ExitCode::SUCCESS
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => ExitCode::from(config_cmd::run_validate() as u8),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = rest.first() {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("xval {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "xval - sensor cross-validation and audio diagnostics v{}

USAGE:
    xval [COMMAND] [OPTIONS]

COMMANDS:
    validate     Cross-validate reference and device datapoint files
    audio        Run DC offset, RMS, and peak checks on a PCM capture
    config       Manage configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

EXAMPLES:
    xval validate --sensor accel --reference ap.json --device chre.json
    xval validate --sensor proximity --max-range 10 --reference ap.json --device chre.json --json
    xval audio --pcm capture.bin
    xval config validate

ENVIRONMENT:
    XVAL_*       Tuning values, see `xval config defaults`
    XVAL_LOG     Log filter (default: info)

EXIT CODES:
    0  Pass
    1  Validation failure
    2  Configuration or input error
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "validate" => {
            eprintln!(
                "xval validate - Cross-validate recorded datapoints

USAGE:
    xval validate --sensor <TYPE> --reference <FILE> --device <FILE> [OPTIONS]

OPTIONS:
    --sensor <TYPE>      accel, gyro, mag, pressure, light, proximity, step_counter
    --reference <FILE>   JSON array of reference datapoints
    --device <FILE>      JSON array of device-under-test datapoints
    --max-range <F>      Sensor max range (proximity threshold is min(range, 5 cm))
    --config <FILE>      Load configuration from a TOML file
    --json               Output in JSON format

DESCRIPTION:
    Pairs samples by nearest timestamp within the skew bound and compares
    every pair under the sensor type's policy.

EXIT CODES:
    0  All pairs matched
    1  No data, no aligned pairs, or a mismatched pair
    2  Bad arguments or unreadable input
"
            );
        }
        "audio" => {
            eprintln!(
                "xval audio - Microphone diagnostics

USAGE:
    xval audio --pcm <FILE> [OPTIONS]

OPTIONS:
    --pcm <FILE>     Raw little-endian signed 16-bit samples
    --config <FILE>  Load thresholds from a TOML file
    --json           Output in JSON format

EXIT CODES:
    0  All checks passed
    1  A check failed or the signal is silent
    2  Bad arguments or malformed capture
"
            );
        }
        "config" => {
            eprintln!(
                "xval config - Manage configuration

USAGE:
    xval config <SUBCOMMAND>

SUBCOMMANDS:
    show [--json]  Show effective configuration
    defaults       Show default values
    validate       Warn about combinations that cannot pass

EXIT CODES:
    0  Success / configuration valid
    1  Configuration has warnings
"
            );
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
        }
    }
}
