// Copyright 2024-2026 xval Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommands for running validations over captured data.
//!
//! ## Usage
//!
//! ```bash
//! xval validate --sensor accel --reference ap.json --device chre.json
//! xval audio --pcm capture.bin
//! xval config show
//! ```

pub mod audio_cmd;
pub mod config_cmd;
pub mod validate_cmd;

use std::collections::HashMap;
use std::path::Path;

use crate::config::{self, EnvConfig};

/// Exit code for a passing run.
pub const EXIT_PASS: i32 = 0;
/// Exit code for a failed validation.
pub const EXIT_FAIL: i32 = 1;
/// Exit code for bad arguments or configuration.
pub const EXIT_CONFIG: i32 = 2;

/// Parsed `--key value` options and bare `--flag`s.
#[derive(Debug, Default)]
pub struct Options {
    values: HashMap<String, String>,
    flags: Vec<String>,
}

impl Options {
    /// Parse `args` against the option names that take a value and the bare flags.
    pub fn parse(args: &[String], valued: &[&str], flags: &[&str]) -> Result<Self, String> {
        let mut opts = Options::default();
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            if flags.contains(&arg) {
                opts.flags.push(arg.to_string());
                i += 1;
            } else if valued.contains(&arg) {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("Missing value for {}", arg))?;
                opts.values.insert(arg.to_string(), value.clone());
                i += 2;
            } else {
                return Err(format!("Unknown argument: {}", arg));
            }
        }
        Ok(opts)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, String> {
        self.get(key).ok_or_else(|| format!("Missing required option {}", key))
    }

    pub fn flag(&self, key: &str) -> bool {
        self.flags.iter().any(|f| f == key)
    }
}

/// Load config from `--config FILE` when given, else from the environment.
pub fn load_config(opts: &Options) -> Result<EnvConfig, String> {
    match opts.get("--config") {
        Some(path) => config::load_file(Path::new(path)).map_err(|e| e.to_string()),
        None => Ok(config::load()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_values_and_flags() {
        let opts = Options::parse(
            &args(&["--sensor", "gyro", "--json"]),
            &["--sensor"],
            &["--json"],
        )
        .unwrap();
        assert_eq!(opts.get("--sensor"), Some("gyro"));
        assert!(opts.flag("--json"));
        assert!(opts.require("--device").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_and_dangling() {
        assert!(Options::parse(&args(&["--what"]), &["--sensor"], &[]).is_err());
        assert!(Options::parse(&args(&["--sensor"]), &["--sensor"], &[]).is_err());
    }
}
