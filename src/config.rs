//! Tool configuration.
//!
//! Settings come from three layers, later layers winning: built-in defaults
//! (the FASDD_CV layout), an optional YAML config file, and command-line
//! overrides. The result is an explicit [`OrganizeConfig`] or
//! [`AnalyzeConfig`] handed to each component's entry point.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::collab::{EvalParams, ExportParams, TrainParams};
use crate::dataset::{read_data_yaml, ClassSchema, DatasetLayout, Split};
use crate::error::PrepError;

pub const DEFAULT_DATASET_ROOT: &str = "FASDD_CV";
pub const DEFAULT_SOURCE_IMAGES: &str = "images";
pub const DEFAULT_SOURCE_LABELS: &str = "annotations/YOLO_CV/labels";
pub const DEFAULT_MANIFESTS_DIR: &str = "annotations/YOLO_CV";
pub const DEFAULT_OUTPUT_DIR: &str = "yolo_format";
pub const DEFAULT_DATA_YAML: &str = "fasdd_data.yaml";
pub const DEFAULT_PLOTS_DIR: &str = "eda_results";

/// Contents of the YAML config file. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    pub dataset_root: Option<PathBuf>,
    pub class_names: Option<Vec<String>>,
    pub organize: OrganizeSection,
    pub analyze: AnalyzeSection,
    pub train: TrainParams,
    pub export: ExportParams,
    pub evaluate: EvalParams,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrganizeSection {
    pub images_dir: Option<PathBuf>,
    pub labels_dir: Option<PathBuf>,
    pub manifests_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub data_yaml: Option<PathBuf>,
    pub splits: Option<Vec<Split>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzeSection {
    /// Root of the organized layout; defaults to the organizer's output.
    pub root: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub labels_dir: Option<PathBuf>,
    pub splits: Option<Vec<Split>>,
    pub data_yaml: Option<PathBuf>,
    pub plots_dir: Option<PathBuf>,
    pub font: Option<PathBuf>,
}

impl PrepConfig {
    /// Load the config file at `path`, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, PrepError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, PrepError> {
        let raw = fs::read_to_string(path).map_err(|source| PrepError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|source| PrepError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn dataset_root(&self) -> PathBuf {
        self.dataset_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_ROOT))
    }

    /// Path of the generated `data.yaml`.
    pub fn data_yaml_path(&self) -> PathBuf {
        resolve(
            &self.dataset_root(),
            self.organize.data_yaml.as_deref(),
            DEFAULT_DATA_YAML,
        )
    }

    fn class_schema(&self, cli: &[String]) -> Result<ClassSchema, PrepError> {
        if !cli.is_empty() {
            return ClassSchema::new(cli.iter().cloned());
        }
        match &self.class_names {
            Some(names) => ClassSchema::new(names.iter().cloned()),
            None => Ok(ClassSchema::default()),
        }
    }

    /// Build the organizer configuration.
    pub fn organize_config(&self, cli: &OrganizeOverrides) -> Result<OrganizeConfig, PrepError> {
        let root = cli.dataset_root.clone().unwrap_or_else(|| self.dataset_root());
        let section = &self.organize;

        let images_dir = resolve(
            &root,
            cli.images_dir.as_deref().or(section.images_dir.as_deref()),
            DEFAULT_SOURCE_IMAGES,
        );
        let labels_dir = resolve(
            &root,
            cli.labels_dir.as_deref().or(section.labels_dir.as_deref()),
            DEFAULT_SOURCE_LABELS,
        );
        let manifests_dir = resolve(
            &root,
            cli.manifests_dir.as_deref().or(section.manifests_dir.as_deref()),
            DEFAULT_MANIFESTS_DIR,
        );
        let output_root = resolve(
            &root,
            cli.output_dir.as_deref().or(section.output_dir.as_deref()),
            DEFAULT_OUTPUT_DIR,
        );
        let data_yaml = resolve(
            &root,
            cli.data_yaml.as_deref().or(section.data_yaml.as_deref()),
            DEFAULT_DATA_YAML,
        );

        let splits = section
            .splits
            .clone()
            .unwrap_or_else(|| Split::ALL.to_vec());
        if splits.is_empty() {
            return Err(PrepError::InvalidConfig {
                message: "organize.splits must name at least one split".to_string(),
            });
        }

        let sources = splits
            .into_iter()
            .map(|split| SplitSource {
                split,
                manifest: manifests_dir.join(format!("{}.txt", split.as_str())),
                images_dir: images_dir.clone(),
                labels_dir: labels_dir.clone(),
            })
            .collect();

        Ok(OrganizeConfig {
            sources,
            output: DatasetLayout::new(output_root),
            data_yaml,
            schema: self.class_schema(&cli.class_names)?,
        })
    }

    /// Build the analyzer configuration.
    pub fn analyze_config(&self, cli: &AnalyzeOverrides) -> Result<AnalyzeConfig, PrepError> {
        let section = &self.analyze;

        let root = cli
            .root
            .clone()
            .or_else(|| section.root.clone())
            .unwrap_or_else(|| {
                resolve(
                    &self.dataset_root(),
                    self.organize.output_dir.as_deref(),
                    DEFAULT_OUTPUT_DIR,
                )
            });
        let images = resolve(
            &root,
            cli.images_dir.as_deref().or(section.images_dir.as_deref()),
            "images",
        );
        let labels = resolve(
            &root,
            cli.labels_dir.as_deref().or(section.labels_dir.as_deref()),
            "labels",
        );

        let splits = if !cli.splits.is_empty() {
            cli.splits.clone()
        } else {
            section
                .splits
                .clone()
                .unwrap_or_else(|| vec![Split::Train, Split::Val])
        };
        if splits.is_empty() {
            return Err(PrepError::InvalidConfig {
                message: "analyze.splits must name at least one split".to_string(),
            });
        }

        let data_yaml = cli.data_yaml.clone().or_else(|| section.data_yaml.clone());
        let schema = match (&data_yaml, cli.class_names.is_empty()) {
            (Some(path), true) => read_data_yaml(path)?.schema()?,
            _ => self.class_schema(&cli.class_names)?,
        };

        Ok(AnalyzeConfig {
            layout: DatasetLayout::with_dirs(root, images, labels),
            schema,
            splits,
            plots_dir: cli
                .plots_dir
                .clone()
                .or_else(|| section.plots_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PLOTS_DIR)),
            font: cli.font.clone().or_else(|| section.font.clone()),
            render_plots: !cli.no_plots,
        })
    }
}

/// `value` (or `default`) relative to `base`, unless already absolute.
fn resolve(base: &Path, value: Option<&Path>, default: &str) -> PathBuf {
    let value = value.unwrap_or_else(|| Path::new(default));
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

/// Command-line overrides for the organizer.
#[derive(Clone, Debug, Default)]
pub struct OrganizeOverrides {
    pub dataset_root: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub labels_dir: Option<PathBuf>,
    pub manifests_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub data_yaml: Option<PathBuf>,
    pub class_names: Vec<String>,
}

/// Command-line overrides for the analyzer.
#[derive(Clone, Debug, Default)]
pub struct AnalyzeOverrides {
    pub root: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub labels_dir: Option<PathBuf>,
    pub splits: Vec<Split>,
    pub class_names: Vec<String>,
    pub data_yaml: Option<PathBuf>,
    pub plots_dir: Option<PathBuf>,
    pub font: Option<PathBuf>,
    pub no_plots: bool,
}

/// Where one split's inputs live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitSource {
    pub split: Split,
    pub manifest: PathBuf,
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

/// Everything the organizer needs.
#[derive(Clone, Debug)]
pub struct OrganizeConfig {
    pub sources: Vec<SplitSource>,
    pub output: DatasetLayout,
    pub data_yaml: PathBuf,
    pub schema: ClassSchema,
}

/// Everything the analyzer needs.
#[derive(Clone, Debug)]
pub struct AnalyzeConfig {
    pub layout: DatasetLayout,
    pub schema: ClassSchema,
    pub splits: Vec<Split>,
    pub plots_dir: PathBuf,
    pub font: Option<PathBuf>,
    pub render_plots: bool,
}
