//! Dataset organizer.
//!
//! Reads one manifest per split, joins each entry against the source image
//! and label stores by basename, and copies complete pairs into the
//! `images/<split>` + `labels/<split>` layout. Finishes by writing the
//! `data.yaml` configuration record.

mod report;

pub use report::{EntryOutcome, OrganizeReport, SkipReason, SplitReport, SplitStatus};

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{OrganizeConfig, SplitSource};
use crate::dataset::manifest::read_manifest;
use crate::dataset::{write_data_yaml, DataYaml, DatasetLayout, IMAGE_EXTENSIONS, LABEL_EXTENSION};
use crate::error::PrepError;
use crate::progress::ProgressObserver;

/// Organize every configured split and write the data config.
///
/// A missing manifest only skips its split. Copy failures abort the run.
pub fn organize_dataset(
    config: &OrganizeConfig,
    progress: &mut dyn ProgressObserver,
) -> Result<OrganizeReport, PrepError> {
    log::info!("Organizing dataset into {}", config.output.root().display());

    let splits: Vec<_> = config.sources.iter().map(|source| source.split).collect();
    config.output.create_split_dirs(&splits)?;

    let mut report = OrganizeReport {
        output_root: config.output.root().to_path_buf(),
        data_yaml: config.data_yaml.clone(),
        splits: Vec::with_capacity(config.sources.len()),
    };

    for source in &config.sources {
        let split_report = organize_split(source, &config.output, progress)?;
        report.splits.push(split_report);
    }

    log::info!("Copied {} pair(s) in total", report.total_copied());

    let absolute_root = fs::canonicalize(config.output.root()).map_err(PrepError::Io)?;
    let data = DataYaml::new(absolute_root, &config.schema);
    write_data_yaml(&config.data_yaml, &data)?;
    log::info!("Wrote data config {}", config.data_yaml.display());

    Ok(report)
}

/// Organize a single split.
pub fn organize_split(
    source: &SplitSource,
    output: &DatasetLayout,
    progress: &mut dyn ProgressObserver,
) -> Result<SplitReport, PrepError> {
    let keys = match read_manifest(&source.manifest) {
        Ok(keys) => keys,
        Err(PrepError::ManifestNotFound { path }) => {
            log::error!(
                "Manifest for split '{}' not found: {}",
                source.split,
                path.display()
            );
            return Ok(SplitReport::manifest_missing(source.split, path));
        }
        Err(err) => return Err(err),
    };

    let images_dst = output.images_dir(source.split);
    let labels_dst = output.labels_dir(source.split);
    let mut report = SplitReport::new(source.split, &source.manifest);

    log::info!("[{}] copying {} manifest entries", source.split, keys.len());
    progress.begin(source.split.as_str(), keys.len());

    for key in &keys {
        let outcome = organize_entry(
            key,
            &source.images_dir,
            &source.labels_dir,
            &images_dst,
            &labels_dst,
        )?;
        if let EntryOutcome::Skipped(reason) = &outcome {
            log::debug!("[{}] skipped '{}': {:?}", source.split, key, reason);
        }
        report.record(&outcome);
        progress.advance();
    }

    progress.finish();
    log::info!(
        "[{}] copied {} of {} entries",
        source.split,
        report.copied,
        report.processed
    );

    Ok(report)
}

/// Copy the image/label pair for `key` if both exist.
pub fn organize_entry(
    key: &str,
    images_src: &Path,
    labels_src: &Path,
    images_dst: &Path,
    labels_dst: &Path,
) -> Result<EntryOutcome, PrepError> {
    let Some(image) = find_image(images_src, key, &IMAGE_EXTENSIONS) else {
        return Ok(EntryOutcome::Skipped(SkipReason::MissingImage));
    };

    let label = labels_src.join(format!("{}.{}", key, LABEL_EXTENSION));
    if !label.is_file() {
        return Ok(EntryOutcome::Skipped(SkipReason::MissingLabel));
    }

    let image_dst = images_dst.join(file_name_of(&image));
    let label_dst = labels_dst.join(file_name_of(&label));
    copy_file(&image, &image_dst)?;
    copy_file(&label, &label_dst)?;

    Ok(EntryOutcome::Copied {
        image: image_dst,
        label: label_dst,
    })
}

/// First `dir/key.<ext>` that exists, trying `extensions` in order.
pub fn find_image(dir: &Path, key: &str, extensions: &[&str]) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| dir.join(format!("{}.{}", key, ext)))
        .find(|candidate| candidate.is_file())
}

fn file_name_of(path: &Path) -> &std::ffi::OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

fn copy_file(from: &Path, to: &Path) -> Result<(), PrepError> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| PrepError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Split;
    use crate::progress::{CountingProgress, NoProgress};

    fn touch(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, contents).expect("write file");
    }

    #[test]
    fn find_image_prefers_extension_order() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("sample.png"), "png");
        touch(&temp.path().join("sample.jpeg"), "jpeg");
        touch(&temp.path().join("sample.jpg"), "jpg");

        let found = find_image(temp.path(), "sample", &IMAGE_EXTENSIONS).expect("found");
        assert!(found.ends_with("sample.jpg"));

        fs::remove_file(temp.path().join("sample.jpg")).unwrap();
        let found = find_image(temp.path(), "sample", &IMAGE_EXTENSIONS).expect("found");
        assert!(found.ends_with("sample.png"));
    }

    #[test]
    fn entry_without_label_is_not_copied() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let src_img = temp.path().join("src/images");
        let src_lbl = temp.path().join("src/labels");
        let dst_img = temp.path().join("dst/images");
        let dst_lbl = temp.path().join("dst/labels");
        fs::create_dir_all(&src_lbl).unwrap();
        fs::create_dir_all(&dst_img).unwrap();
        fs::create_dir_all(&dst_lbl).unwrap();
        touch(&src_img.join("img2.png"), "png");

        let outcome = organize_entry("img2", &src_img, &src_lbl, &dst_img, &dst_lbl)
            .expect("organize entry");
        assert_eq!(outcome, EntryOutcome::Skipped(SkipReason::MissingLabel));
        assert!(!dst_img.join("img2.png").exists());

        let outcome = organize_entry("nope", &src_img, &src_lbl, &dst_img, &dst_lbl)
            .expect("organize entry");
        assert_eq!(outcome, EntryOutcome::Skipped(SkipReason::MissingImage));
    }

    #[test]
    fn missing_manifest_skips_only_that_split() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let output = DatasetLayout::new(temp.path().join("out"));
        output.create_split_dirs(&[Split::Val]).unwrap();

        let source = SplitSource {
            split: Split::Val,
            manifest: temp.path().join("val.txt"),
            images_dir: temp.path().join("images"),
            labels_dir: temp.path().join("labels"),
        };

        let report = organize_split(&source, &output, &mut NoProgress).expect("split");
        assert_eq!(report.status, SplitStatus::ManifestMissing);
        assert_eq!(report.copied, 0);
        assert_eq!(report.processed, 0);
    }

    #[test]
    fn split_reports_progress_per_entry() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("train.txt"), "a.jpg\nb.jpg\n\nc.jpg\n");
        touch(&temp.path().join("images/a.jpg"), "a");
        touch(&temp.path().join("labels/a.txt"), "0 0.5 0.5 0.1 0.1\n");

        let output = DatasetLayout::new(temp.path().join("out"));
        output.create_split_dirs(&[Split::Train]).unwrap();
        let source = SplitSource {
            split: Split::Train,
            manifest: temp.path().join("train.txt"),
            images_dir: temp.path().join("images"),
            labels_dir: temp.path().join("labels"),
        };

        let mut progress = CountingProgress::default();
        let report = organize_split(&source, &output, &mut progress).expect("split");

        assert_eq!(report.processed, 3);
        assert_eq!(report.copied, 1);
        assert_eq!(report.missing_image, 2);
        assert_eq!(progress.stages, vec![("train".to_string(), 3)]);
        assert_eq!(progress.advanced, 3);
        assert_eq!(progress.finished, 1);
    }
}
