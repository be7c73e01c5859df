//! Fuzz target for the annotation line parser.
//!
//! Feeds arbitrary UTF-8 lines to `parse_line` and derives area and aspect
//! ratio from any record it accepts.

#![no_main]

use fasdd_prep::dataset::fuzz_parse_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    fuzz_parse_line(line);
});
