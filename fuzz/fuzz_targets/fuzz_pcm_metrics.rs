//! Fuzz target for PCM decoding and the audio diagnostics checks.
//!
//! Arbitrary capture bytes must only ever produce a verdict or an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use xval_core::signal::decode_pcm_le;
use xval_core::AudioThresholds;

fuzz_target!(|data: &[u8]| {
    if let Ok(samples) = decode_pcm_le(data) {
        if let Ok(verdict) = AudioThresholds::default().evaluate(&samples) {
            assert!(verdict.metrics.rms_db.is_finite());
            assert!(verdict.metrics.peak_dbfs.is_finite());
            assert!(verdict.metrics.rms_db <= verdict.metrics.peak_dbfs + 1e-9);
        }
    }
});
