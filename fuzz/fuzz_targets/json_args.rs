//! Fuzz target for JSON argument translation.
//!
//! Ensures arbitrary JSON input never panics the scalar-to-bus-value
//! translation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use buspeek::value::from_json;

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8 strings
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(s) {
            // Should not panic on any JSON input
            let _ = from_json(&json);
        }
    }
});
