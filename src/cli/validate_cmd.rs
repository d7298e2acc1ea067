// Copyright 2024-2026 xval Contributors
// SPDX-License-Identifier: Apache-2.0

//! `validate`: cross-validate two recorded datapoint files.
//!
//! Each file is a JSON array of `{"timestamp": <ns>, "values": [..]}`.

use std::path::Path;

use serde::Serialize;

use super::{load_config, Options, EXIT_CONFIG, EXIT_FAIL, EXIT_PASS};
use crate::datapoint::{parse_datapoints, Datapoint, Source};
use crate::error::ValidationError;
use crate::sensor::SensorType;
use crate::validator::CrossValidator;

const VALUED: &[&str] = &["--sensor", "--reference", "--device", "--max-range", "--config"];
const FLAGS: &[&str] = &["--json"];

#[derive(Debug, Serialize)]
struct Summary<'a> {
    sensor: &'a str,
    passed: bool,
    pairs: usize,
    match_ratio: f64,
    error: Option<String>,
}

/// Read a datapoint file and tag every sample with `source`, ordered by timestamp.
pub fn read_datapoints(path: &Path, source: Source) -> Result<Vec<Datapoint>, ValidationError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ValidationError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    let mut data = parse_datapoints(&text, source).map_err(|e| {
        ValidationError::Config(format!("invalid datapoints in {}: {}", path.display(), e))
    })?;
    if data.windows(2).any(|w| w[0].timestamp > w[1].timestamp) {
        tracing::debug!(path = %path.display(), "sorting out-of-order datapoints");
        data.sort_by_key(|dp| dp.timestamp);
    }
    Ok(data)
}

type Inputs = (SensorType, Vec<Datapoint>, Vec<Datapoint>, f32);

fn parse_inputs(opts: &Options) -> Result<Inputs, String> {
    let sensor: SensorType = opts
        .require("--sensor")?
        .parse()
        .map_err(|e: ValidationError| e.to_string())?;
    let reference = read_datapoints(Path::new(opts.require("--reference")?), Source::Reference)
        .map_err(|e| e.to_string())?;
    let device = read_datapoints(Path::new(opts.require("--device")?), Source::DeviceUnderTest)
        .map_err(|e| e.to_string())?;
    let max_range = match opts.get("--max-range") {
        Some(v) => v.parse::<f32>().map_err(|_| format!("Invalid --max-range: {}", v))?,
        None => f32::MAX,
    };
    Ok((sensor, reference, device, max_range))
}

/// Run the validate command. Returns the process exit code.
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

    let inputs = parse_inputs(&opts);
    let (sensor, reference, device, max_range) = match inputs {
        Ok(i) => i,
        Err(msg) => {
            eprintln!("{}", msg);
            return EXIT_CONFIG;
        }
    };

    let validator = CrossValidator::new(&cfg.validator);
    let result = validator.validate_sequences(sensor, &reference, &device, max_range);
    let summary = match &result {
        Ok(outcome) => Summary {
            sensor: sensor.name(),
            passed: true,
            pairs: outcome.pairs,
            match_ratio: outcome.match_ratio,
            error: None,
        },
        Err(e) => Summary {
            sensor: sensor.name(),
            passed: false,
            pairs: 0,
            match_ratio: 0.0,
            error: Some(e.to_string()),
        },
    };

    if opts.flag("--json") {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to encode summary: {}", e),
        }
    } else if let Some(err) = &summary.error {
        println!("{}: FAIL - {}", summary.sensor, err);
    } else {
        println!(
            "{}: PASS ({} pairs, match ratio {:.3})",
            summary.sensor, summary.pairs, summary.match_ratio
        );
    }

    match result {
        Ok(_) => EXIT_PASS,
        Err(e) if e.is_configuration() => EXIT_CONFIG,
        Err(_) => EXIT_FAIL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{clear_env_vars, ENV_LOCK};
    use std::io::Write;

    fn write_json(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_read_datapoints_tags_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            &dir,
            "dev.json",
            r#"[{"timestamp": 20, "values": [1.0]}, {"timestamp": 10, "values": [2.0]}]"#,
        );
        let data = read_datapoints(Path::new(&path), Source::DeviceUnderTest).unwrap();
        assert_eq!(data[0].timestamp, 10);
        assert!(data.iter().all(|d| d.source == Source::DeviceUnderTest));
    }

    #[test]
    fn test_pressure_files_pass_and_fail() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let dir = tempfile::tempdir().unwrap();
        let ap = write_json(&dir, "ap.json", r#"[{"timestamp": 0, "values": [1013.25]}]"#);
        let close = write_json(&dir, "close.json", r#"[{"timestamp": 1000, "values": [1013.26]}]"#);
        let far = write_json(&dir, "far.json", r#"[{"timestamp": 1000, "values": [1000.0]}]"#);

        let pass = run(&args(&["--sensor", "pressure", "--reference", &ap, "--device", &close]));
        assert_eq!(pass, EXIT_PASS);
        let fail = run(&args(&["--sensor", "pressure", "--reference", &ap, "--device", &far]));
        assert_eq!(fail, EXIT_FAIL);
    }

    #[test]
    fn test_missing_sensor_is_config_error() {
        assert_eq!(run(&args(&["--reference", "a.json"])), EXIT_CONFIG);
    }
}
