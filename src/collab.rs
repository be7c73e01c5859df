//! Hand-off to the external `yolo` command line.
//!
//! Training, export and test-split evaluation are performed by the
//! Ultralytics CLI. This module only builds its `key=value` invocation from the
//! generated data config and either prints or launches it. Nothing the
//! collaborator writes is read back.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::PrepError;

pub const DEFAULT_PROGRAM: &str = "yolo";

/// Training hyperparameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainParams {
    pub model: String,
    pub workers: u32,
    pub epochs: u32,
    pub imgsz: u32,
    pub patience: u32,
    pub cache: bool,
    pub amp: bool,
    pub compile: bool,
    pub batch: i32,
    pub project: String,
    pub name: String,
    pub exist_ok: bool,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            model: "yolo11n.pt".to_string(),
            workers: 2,
            epochs: 30,
            imgsz: 640,
            patience: 5,
            cache: true,
            amp: true,
            compile: true,
            batch: 32,
            project: "experiments".to_string(),
            name: "yolov11s_30".to_string(),
            exist_ok: true,
        }
    }
}

impl TrainParams {
    pub fn command(&self, program: &str, data: &Path) -> YoloCommand {
        YoloCommand::new(program, ["detect", "train"])
            .arg("data", data.display())
            .arg("model", &self.model)
            .arg("workers", self.workers)
            .arg("epochs", self.epochs)
            .arg("imgsz", self.imgsz)
            .arg("patience", self.patience)
            .flag("cache", self.cache)
            .flag("amp", self.amp)
            .flag("compile", self.compile)
            .arg("batch", self.batch)
            .arg("project", &self.project)
            .arg("name", &self.name)
            .flag("exist_ok", self.exist_ok)
    }
}

/// Model export settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportParams {
    pub model: PathBuf,
    pub format: String,
    pub device: String,
    pub half: bool,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            model: PathBuf::from("./experiments/yolov11n/weights/best.pt"),
            format: "ncnn".to_string(),
            device: "0".to_string(),
            half: true,
        }
    }
}

impl ExportParams {
    pub fn command(&self, program: &str) -> YoloCommand {
        YoloCommand::new(program, ["export"])
            .arg("model", self.model.display())
            .arg("format", &self.format)
            .arg("device", &self.device)
            .flag("half", self.half)
    }
}

/// Validation settings for evaluating a trained model.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalParams {
    pub model: PathBuf,
    pub split: String,
    pub imgsz: u32,
    pub conf: f64,
    pub iou: f64,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            model: PathBuf::from("./experiments/yolov11n/weights/best_ncnn_model"),
            split: "test".to_string(),
            imgsz: 640,
            conf: 0.1,
            iou: 0.5,
        }
    }
}

impl EvalParams {
    pub fn command(&self, program: &str, data: &Path) -> YoloCommand {
        YoloCommand::new(program, ["detect", "val"])
            .arg("model", self.model.display())
            .arg("data", data.display())
            .arg("split", &self.split)
            .arg("imgsz", self.imgsz)
            .arg("conf", self.conf)
            .arg("iou", self.iou)
    }
}

/// A collaborator invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YoloCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl YoloCommand {
    pub fn new<'a>(program: &str, leading: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            program: program.to_string(),
            args: leading.into_iter().map(str::to_string).collect(),
        }
    }

    fn arg(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.args.push(format!("{}={}", key, value));
        self
    }

    // The yolo CLI spells booleans the Python way.
    fn flag(self, key: &str, value: bool) -> Self {
        self.arg(key, if value { "True" } else { "False" })
    }
}

impl fmt::Display for YoloCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    if !word.is_empty() && !word.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', "'\\''"))
}

pub fn check_data_config(path: &Path) -> Result<(), PrepError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PrepError::DataConfigNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Trained weights may be a file (`best.pt`) or an exported directory.
pub fn check_model(path: &Path) -> Result<(), PrepError> {
    if path.exists() {
        Ok(())
    } else {
        Err(PrepError::ModelNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Run `command` to completion.
pub fn launch(command: &YoloCommand) -> Result<(), PrepError> {
    log::info!("Launching: {}", command);
    let status = Command::new(&command.program)
        .args(&command.args)
        .status()
        .map_err(|source| PrepError::CollaboratorSpawn {
            program: command.program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(PrepError::CollaboratorFailed {
            command: command.to_string(),
            status: status.to_string(),
        });
    }
    Ok(())
}
