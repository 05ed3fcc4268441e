//! Fuzz target for the TOML manifest parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_manifest_parser
//!
//! This exercises `ModelManifest::parse()` with arbitrary byte sequences to
//! find panics or hangs in the TOML parsing and validation pipeline.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Try to parse arbitrary bytes as a TOML manifest
    if let Ok(s) = std::str::from_utf8(data) {
        // We don't care about the result, just that it doesn't panic
        if let Ok(manifest) = keel_manifest::ModelManifest::parse(s) {
            // A manifest that validates must also build cleanly.
            let _ = manifest.build_container();
        }
    }
});
