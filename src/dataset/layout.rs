//! Ultralytics-style directory layout and the `data.yaml` configuration record.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::{ClassSchema, Split};
use crate::error::PrepError;

/// Recognized image extensions, in probe priority order.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];
pub const LABEL_EXTENSION: &str = "txt";

/// A dataset root with `images/<split>` and `labels/<split>` subtrees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetLayout {
    root: PathBuf,
    images: PathBuf,
    labels: PathBuf,
}

impl DatasetLayout {
    /// Standard layout: `<root>/images` and `<root>/labels`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            images: root.join("images"),
            labels: root.join("labels"),
            root,
        }
    }

    /// Layout with explicit image and label directories.
    pub fn with_dirs(
        root: impl Into<PathBuf>,
        images: impl Into<PathBuf>,
        labels: impl Into<PathBuf>,
    ) -> Self {
        Self {
            root: root.into(),
            images: images.into(),
            labels: labels.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self, split: Split) -> PathBuf {
        self.images.join(split.as_str())
    }

    pub fn labels_dir(&self, split: Split) -> PathBuf {
        self.labels.join(split.as_str())
    }

    /// Create `images/<split>` and `labels/<split>` for every given split.
    pub fn create_split_dirs(&self, splits: &[Split]) -> Result<(), PrepError> {
        for split in splits {
            fs::create_dir_all(self.images_dir(*split)).map_err(PrepError::Io)?;
            fs::create_dir_all(self.labels_dir(*split)).map_err(PrepError::Io)?;
            log::debug!("created directories for split '{}'", split);
        }
        Ok(())
    }
}

/// The generated dataset configuration consumed by the analyzer and trainer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataYaml {
    pub path: PathBuf,
    pub train: String,
    pub val: String,
    pub test: String,
    pub nc: usize,
    pub names: Vec<String>,
}

impl DataYaml {
    /// Record for a layout rooted at `root` (should be absolute).
    pub fn new(root: impl Into<PathBuf>, schema: &ClassSchema) -> Self {
        Self {
            path: root.into(),
            train: split_images_rel(Split::Train),
            val: split_images_rel(Split::Val),
            test: split_images_rel(Split::Test),
            nc: schema.len(),
            names: schema.names().to_vec(),
        }
    }

    pub fn schema(&self) -> Result<ClassSchema, PrepError> {
        ClassSchema::new(self.names.iter().cloned())
    }
}

fn split_images_rel(split: Split) -> String {
    format!("images/{}", split.as_str())
}

/// Serialize `data` to `path`, creating the parent directory.
pub fn write_data_yaml(path: &Path, data: &DataYaml) -> Result<(), PrepError> {
    let yaml = serde_yaml::to_string(data).map_err(|source| PrepError::DataYamlWrite {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(PrepError::Io)?;
        }
    }
    fs::write(path, yaml).map_err(PrepError::Io)
}

#[derive(Debug, Deserialize)]
struct DataYamlFile {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    train: Option<String>,
    #[serde(default)]
    val: Option<String>,
    #[serde(default)]
    test: Option<String>,
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

/// Read a `data.yaml`; `names` may be a list or an index mapping.
pub fn read_data_yaml(path: &Path) -> Result<DataYaml, PrepError> {
    let raw = fs::read_to_string(path).map_err(PrepError::Io)?;
    let parsed: DataYamlFile =
        serde_yaml::from_str(&raw).map_err(|source| PrepError::DataYamlParse {
            path: path.to_path_buf(),
            source,
        })?;

    let names = match parsed.names {
        DataYamlNames::Sequence(names) => names,
        DataYamlNames::Mapping(mapping) => {
            let len = mapping.keys().max().map_or(0, |max| max + 1);
            let mut names = vec![String::new(); len];
            for (index, name) in mapping {
                names[index] = name;
            }
            for (index, name) in names.iter_mut().enumerate() {
                if name.trim().is_empty() {
                    *name = format!("class_{}", index);
                }
            }
            names
        }
    };

    Ok(DataYaml {
        path: parsed
            .path
            .unwrap_or_else(|| path.parent().map(Path::to_path_buf).unwrap_or_default()),
        train: parsed.train.unwrap_or_else(|| split_images_rel(Split::Train)),
        val: parsed.val.unwrap_or_else(|| split_images_rel(Split::Val)),
        test: parsed.test.unwrap_or_else(|| split_images_rel(Split::Test)),
        nc: names.len(),
        names,
    })
}

/// List files directly inside `dir` whose extension is in `extensions`.
///
/// A missing directory yields an empty list; an unreadable one is an error.
/// Results are sorted by path.
pub fn collect_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, PrepError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(PrepError::Traverse {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(err) => {
                // Keep the path so the per-file read reports it as unreadable.
                log::warn!("Skipping unreadable entry in {}: {}", dir.display(), err);
                if let Some(path) = err.path() {
                    if has_extension(path, extensions) {
                        files.push(path.to_path_buf());
                    }
                }
                continue;
            }
        };

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}
