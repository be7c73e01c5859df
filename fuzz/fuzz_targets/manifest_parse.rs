//! Fuzz target for split manifest parsing and basename extraction.

#![no_main]

use fasdd_prep::dataset::manifest::fuzz_parse_manifest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let keys = fuzz_parse_manifest(text);
    assert!(keys <= text.lines().count());
});
