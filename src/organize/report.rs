//! Organizer run report.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::dataset::Split;

/// Why a manifest entry was not copied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No `key.<ext>` in the image store.
    MissingImage,
    /// Image found but no `key.txt` in the label store.
    MissingLabel,
}

/// Result of organizing one manifest entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    Copied { image: PathBuf, label: PathBuf },
    Skipped(SkipReason),
}

/// How a split's manifest was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStatus {
    Processed,
    ManifestMissing,
}

/// Counts for one split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    pub split: Split,
    pub manifest: PathBuf,
    pub status: SplitStatus,
    /// Manifest entries processed.
    pub processed: usize,
    /// Complete pairs copied.
    pub copied: usize,
    pub missing_image: usize,
    pub missing_label: usize,
}

impl SplitReport {
    pub fn new(split: Split, manifest: impl Into<PathBuf>) -> Self {
        Self {
            split,
            manifest: manifest.into(),
            status: SplitStatus::Processed,
            processed: 0,
            copied: 0,
            missing_image: 0,
            missing_label: 0,
        }
    }

    pub fn manifest_missing(split: Split, manifest: impl Into<PathBuf>) -> Self {
        Self {
            status: SplitStatus::ManifestMissing,
            ..Self::new(split, manifest)
        }
    }

    /// Fold one entry's outcome into the counts.
    pub fn record(&mut self, outcome: &EntryOutcome) {
        self.processed += 1;
        match outcome {
            EntryOutcome::Copied { .. } => self.copied += 1,
            EntryOutcome::Skipped(SkipReason::MissingImage) => self.missing_image += 1,
            EntryOutcome::Skipped(SkipReason::MissingLabel) => self.missing_label += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.missing_image + self.missing_label
    }
}

/// The result of a full organizer run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrganizeReport {
    pub output_root: PathBuf,
    pub data_yaml: PathBuf,
    pub splits: Vec<SplitReport>,
}

impl OrganizeReport {
    pub fn total_processed(&self) -> usize {
        self.splits.iter().map(|s| s.processed).sum()
    }

    pub fn total_copied(&self) -> usize {
        self.splits.iter().map(|s| s.copied).sum()
    }

    pub fn split(&self, split: Split) -> Option<&SplitReport> {
        self.splits.iter().find(|s| s.split == split)
    }

    pub fn missing_manifests(&self) -> impl Iterator<Item = &SplitReport> {
        self.splits
            .iter()
            .filter(|s| s.status == SplitStatus::ManifestMissing)
    }
}

impl fmt::Display for OrganizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset organized into {}", self.output_root.display())?;
        writeln!(f)?;
        writeln!(
            f,
            "  {:<6} {:>10} {:>10} {:>14} {:>14}",
            "split", "processed", "copied", "missing image", "missing label"
        )?;
        for s in &self.splits {
            match s.status {
                SplitStatus::Processed => writeln!(
                    f,
                    "  {:<6} {:>10} {:>10} {:>14} {:>14}",
                    s.split.as_str(),
                    s.processed,
                    s.copied,
                    s.missing_image,
                    s.missing_label
                )?,
                SplitStatus::ManifestMissing => writeln!(
                    f,
                    "  {:<6} manifest not found: {}",
                    s.split.as_str(),
                    s.manifest.display()
                )?,
            }
        }
        writeln!(f)?;
        writeln!(
            f,
            "Total copied: {} pair(s) from {} manifest entries",
            self.total_copied(),
            self.total_processed()
        )?;
        writeln!(f, "Data config: {}", self.data_yaml.display())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_tallies_outcomes() {
        let mut report = SplitReport::new(Split::Train, "train.txt");
        report.record(&EntryOutcome::Copied {
            image: "a.jpg".into(),
            label: "a.txt".into(),
        });
        report.record(&EntryOutcome::Skipped(SkipReason::MissingImage));
        report.record(&EntryOutcome::Skipped(SkipReason::MissingLabel));

        assert_eq!(report.processed, 3);
        assert_eq!(report.copied, 1);
        assert_eq!(report.skipped(), 2);
    }

    #[test]
    fn display_lists_each_split_and_total() {
        let mut train = SplitReport::new(Split::Train, "train.txt");
        train.processed = 2;
        train.copied = 1;
        train.missing_label = 1;
        let report = OrganizeReport {
            output_root: "out".into(),
            data_yaml: "data.yaml".into(),
            splits: vec![train, SplitReport::manifest_missing(Split::Test, "test.txt")],
        };

        let text = report.to_string();
        assert!(text.contains("train"));
        assert!(text.contains("manifest not found: test.txt"));
        assert!(text.contains("Total copied: 1 pair(s) from 2 manifest entries"));
    }
}
