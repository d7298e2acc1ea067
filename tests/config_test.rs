//! Tests for TOML configuration files.

use std::io::Write;
use std::time::Duration;

use xval_core::config;
use xval_core::telemetry::LogFormat;

#[test]
fn test_load_file_reads_every_section() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
max_skew_ns = 2000000
far_distance_cm = 3.5
continuous_timeout_ms = 250
channel_capacity = 64

[audio]
dc_offset_limit = 10
tolerance_db = 1.5

[log]
format = "json"
level = "xval_core=debug"
"#
    )
    .unwrap();

    let cfg = config::load_file(file.path()).unwrap();
    assert_eq!(cfg.validator.max_skew_ns, 2_000_000);
    assert_eq!(cfg.validator.far_distance_cm, 3.5);
    assert_eq!(cfg.timings.continuous_timeout, Duration::from_millis(250));
    assert_eq!(cfg.timings.on_change_timeout, Duration::from_millis(1000));
    assert_eq!(cfg.channel_capacity, 64);
    assert_eq!(cfg.audio.dc_offset_limit, 10);
    assert_eq!(cfg.audio.tolerance_db, 1.5);
    assert_eq!(cfg.audio.rms_target_db, 22.0);
    assert_eq!(cfg.log.format, LogFormat::Json);
    assert_eq!(cfg.log.level, "xval_core=debug");
}

#[test]
fn test_missing_file_is_config_error() {
    let err = config::load_file(std::path::Path::new("/nonexistent/xval.toml")).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_bad_log_format_is_rejected() {
    let err = config::from_toml_str("[log]\nformat = \"xml\"\n").unwrap_err();
    assert!(err.to_string().contains("xml"));
}

#[test]
fn test_effective_config_serializes() {
    let cfg = config::from_toml_str("info_timeout_ms = 300\n").unwrap();
    let json = serde_json::to_value(cfg.effective_config()).unwrap();
    assert_eq!(json["info_timeout_ms"], 300);
    assert_eq!(json["max_skew_ns"], 4_000_000);
}
