//! Split manifests: one example path or identifier per line.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::PrepError;

/// Extract the join key from a manifest line.
///
/// The directory prefix is dropped, then everything from the first `.`
/// onward. Returns `None` for blank lines.
pub fn basename_key(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let file_name = trimmed
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(trimmed);
    let stem = file_name.split('.').next().unwrap_or(file_name);
    Some(stem.to_string())
}

/// Parse manifest text into keys, in order, keeping duplicates.
pub fn parse_manifest(text: &str) -> Vec<String> {
    text.lines().filter_map(basename_key).collect()
}

/// Read a manifest file from disk.
pub fn read_manifest(path: &Path) -> Result<Vec<String>, PrepError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(parse_manifest(&text)),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(PrepError::ManifestNotFound {
            path: path.to_path_buf(),
        }),
        Err(err) => Err(PrepError::Io(err)),
    }
}

/// Fuzz-only entrypoint for manifest parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_manifest(input: &str) -> usize {
    parse_manifest(input).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_directories_and_extensions() {
        assert_eq!(basename_key("img1").as_deref(), Some("img1"));
        assert_eq!(basename_key("img1.jpg").as_deref(), Some("img1"));
        assert_eq!(
            basename_key("  data/images/fire_0001.jpg \n").as_deref(),
            Some("fire_0001")
        );
        assert_eq!(
            basename_key(r"C:\data\smoke_7.png").as_deref(),
            Some("smoke_7")
        );
    }

    #[test]
    fn cuts_at_first_dot() {
        assert_eq!(basename_key("a/b/frame.v2.jpg").as_deref(), Some("frame"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(basename_key("   "), None);
        assert_eq!(parse_manifest("a.jpg\n\n  \nb.jpg\n"), vec!["a", "b"]);
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        assert_eq!(
            parse_manifest("b.jpg\na.jpg\nb.png\n"),
            vec!["b", "a", "b"]
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = read_manifest(&temp.path().join("train.txt")).unwrap_err();
        assert!(matches!(err, PrepError::ManifestNotFound { .. }));
    }
}
