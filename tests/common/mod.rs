#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use fasdd_prep::config::{AnalyzeOverrides, OrganizeOverrides, PrepConfig};
use fasdd_prep::dataset::Split;

pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}

/// A FASDD_CV-shaped source tree rooted in a temp dir.
pub struct SourceTree {
    pub root: PathBuf,
}

impl SourceTree {
    pub fn new(base: &Path) -> Self {
        let root = base.join("FASDD_CV");
        fs::create_dir_all(&root).expect("create dataset root");
        Self { root }
    }

    pub fn image(&self, file_name: &str) -> PathBuf {
        self.root.join("images").join(file_name)
    }

    pub fn label(&self, key: &str) -> PathBuf {
        self.root
            .join("annotations/YOLO_CV/labels")
            .join(format!("{}.txt", key))
    }

    pub fn manifest(&self, split: Split) -> PathBuf {
        self.root
            .join("annotations/YOLO_CV")
            .join(format!("{}.txt", split))
    }

    pub fn output(&self) -> PathBuf {
        self.root.join("yolo_format")
    }

    pub fn data_yaml(&self) -> PathBuf {
        self.root.join("fasdd_data.yaml")
    }

    pub fn add_image(&self, file_name: &str) {
        write_file(&self.image(file_name), format!("image bytes for {}", file_name));
    }

    pub fn add_label(&self, key: &str, lines: &str) {
        write_file(&self.label(key), lines);
    }

    pub fn add_manifest(&self, split: Split, entries: &[&str]) {
        let mut text = entries.join("\n");
        text.push('\n');
        write_file(&self.manifest(split), text);
    }

    /// Config rooted at this tree with everything else at defaults.
    pub fn config(&self) -> PrepConfig {
        PrepConfig {
            dataset_root: Some(self.root.clone()),
            ..Default::default()
        }
    }
}

/// Organized-layout helper: `<root>/images/<split>` + `<root>/labels/<split>`.
pub fn add_organized(root: &Path, split: Split, key: &str, label: Option<&str>) {
    write_file(
        &root.join("images").join(split.as_str()).join(format!("{}.jpg", key)),
        "jpg",
    );
    if let Some(lines) = label {
        write_file(
            &root.join("labels").join(split.as_str()).join(format!("{}.txt", key)),
            lines,
        );
    }
}

pub fn organize_overrides() -> OrganizeOverrides {
    OrganizeOverrides::default()
}

pub fn analyze_overrides(root: &Path) -> AnalyzeOverrides {
    AnalyzeOverrides {
        root: Some(root.to_path_buf()),
        plots_dir: Some(root.join("plots")),
        no_plots: true,
        ..Default::default()
    }
}

/// Every file under `dir` with its bytes, keyed by relative path.
pub fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry
                .path()
                .strip_prefix(dir)
                .expect("entry under dir")
                .to_path_buf();
            let bytes = fs::read(entry.path()).expect("read file");
            (rel, bytes)
        })
        .collect()
}
