//! Normalized YOLO annotation lines.

use serde::Serialize;

/// Guard added to the height when computing aspect ratios.
pub const ASPECT_EPSILON: f64 = 1e-6;

/// One bounding box in normalized `cx cy w h` form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AnnotationRecord {
    pub class_id: i64,
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

impl AnnotationRecord {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// `width / (height + ε)`; finite even for zero-height boxes.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / (self.height + ASPECT_EPSILON)
    }
}

/// What a single label line turned out to be.
#[derive(Clone, Debug, PartialEq)]
pub enum LineOutcome {
    Record(AnnotationRecord),
    /// Whitespace only.
    Blank,
    /// Wrong field count or unparseable numbers.
    Malformed,
}

/// Parse one line of a YOLO label file.
///
/// Exactly five whitespace-separated fields are required. Class range is not
/// checked here; that depends on the schema.
pub fn parse_line(line: &str) -> LineOutcome {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineOutcome::Blank;
    }

    // Take at most 6 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();
    if tokens.len() != 5 {
        return LineOutcome::Malformed;
    }

    let Ok(class_id) = tokens[0].parse::<i64>() else {
        return LineOutcome::Malformed;
    };

    let mut values = [0.0f64; 4];
    for (slot, raw) in values.iter_mut().zip(&tokens[1..]) {
        match raw.parse::<f64>() {
            Ok(v) => *slot = v,
            Err(_) => return LineOutcome::Malformed,
        }
    }
    let [cx, cy, width, height] = values;

    LineOutcome::Record(AnnotationRecord {
        class_id,
        cx,
        cy,
        width,
        height,
    })
}

/// Fuzz-only entrypoint for single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_line(input: &str) {
    if let LineOutcome::Record(record) = parse_line(input) {
        let _ = record.area();
        let _ = record.aspect_ratio();
    }
}
