#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// One generated label line and what it should contribute.
#[derive(Clone, Debug, PartialEq)]
pub enum GenLine {
    Valid {
        class_id: i64,
        width: f64,
        height: f64,
    },
    OutOfRange(i64),
    Blank,
    Malformed(String),
}

impl GenLine {
    pub fn render(&self) -> String {
        match self {
            GenLine::Valid {
                class_id,
                width,
                height,
            } => format!("{} 0.5 0.5 {} {}", class_id, width, height),
            GenLine::OutOfRange(class_id) => format!("{} 0.5 0.5 0.1 0.1", class_id),
            GenLine::Blank => "   ".to_string(),
            GenLine::Malformed(text) => text.clone(),
        }
    }
}

/// Normalized box extents, including degenerate zero-height boxes.
pub fn arb_extent() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        8 => 0.0f64..=1.0,
    ]
}

pub fn arb_line(num_classes: i64) -> impl Strategy<Value = GenLine> {
    prop_oneof![
        6 => (0..num_classes, arb_extent(), arb_extent()).prop_map(|(class_id, width, height)| {
            GenLine::Valid {
                class_id,
                width,
                height,
            }
        }),
        1 => prop_oneof![(-5i64..0), (num_classes..num_classes + 5)].prop_map(GenLine::OutOfRange),
        1 => Just(GenLine::Blank),
        1 => prop_oneof![
            Just("0 0.5 0.5 0.1".to_string()),
            Just("0 0.5 0.5 0.1 0.1 0.9".to_string()),
            Just("fire 0.5 0.5 0.1 0.1".to_string()),
            Just("0 a b c d".to_string()),
            "[a-z]{1,8}",
        ]
        .prop_map(GenLine::Malformed),
    ]
}

/// A label file: possibly empty, otherwise a handful of lines.
pub fn arb_label_file(num_classes: i64) -> impl Strategy<Value = Vec<GenLine>> {
    prop::collection::vec(arb_line(num_classes), 0..6)
}

pub fn render_file(lines: &[GenLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}\n", line.render()))
        .collect()
}
