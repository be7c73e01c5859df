use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fasdd-prep operations.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    ReportJson(#[from] serde_json::Error),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Manifest file not found: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write data config {path}: {source}")]
    DataYamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse data config {path}: {source}")]
    DataYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed while traversing {path}: {source}")]
    Traverse {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("No label files found in splits: {splits}")]
    NoLabelFiles { splits: String },

    #[error("Total image count is 0; cannot compute dataset percentages")]
    NoImages,

    #[error("Failed to load font {path}: {message}")]
    FontLoad { path: PathBuf, message: String },

    #[error("Failed to write plot {path}: {source}")]
    PlotWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Model not found: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("Data config not found: {path}")]
    DataConfigNotFound { path: PathBuf },

    #[error("Failed to launch '{program}': {source}")]
    CollaboratorSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}")]
    CollaboratorFailed { command: String, status: String },
}
