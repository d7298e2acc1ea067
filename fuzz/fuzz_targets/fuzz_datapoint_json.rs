//! Fuzz target for recorded datapoint files.

#![no_main]

use libfuzzer_sys::fuzz_target;
use xval_core::datapoint::parse_datapoints;
use xval_core::Source;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(points) = parse_datapoints(text, Source::DeviceUnderTest) {
            assert!(points.iter().all(|dp| dp.source == Source::DeviceUnderTest));
        }
    }
});
