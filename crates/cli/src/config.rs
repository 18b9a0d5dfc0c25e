use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Which detector backs the locator stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    Seeta,
    Ultraface,
}

/// One single-output model and its tensor access points.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSection {
    pub path: PathBuf,
    pub input_node: String,
    pub output_node: String,
}

/// A joint model with separate age and gender heads.
#[derive(Debug, Clone, Deserialize)]
pub struct JointModelSection {
    pub path: PathBuf,
    pub input_node: String,
    pub age_output: String,
    pub gender_output: String,
}

fn default_input_width() -> u32 {
    agelens_core::shared::constants::DEFAULT_CROP_WIDTH
}

fn default_input_height() -> u32 {
    agelens_core::shared::constants::DEFAULT_CROP_HEIGHT
}

fn default_input_depth() -> u32 {
    agelens_core::shared::constants::DEFAULT_COLOR_DEPTH
}

/// Startup configuration: detector and model wiring plus preprocessing.
///
/// Loaded once; any defect is fatal before the pipeline is built. Only the
/// models the chosen display mode needs have to be present.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub locator: LocatorKind,
    /// SeetaFace `.bin` or Ultraface `.onnx`, matching `locator`.
    pub locator_model: PathBuf,

    #[serde(default = "default_input_width")]
    pub input_width: u32,
    #[serde(default = "default_input_height")]
    pub input_height: u32,
    #[serde(default = "default_input_depth")]
    pub input_depth: u32,

    /// Divide-by-rate rescale applied before mean subtraction, if set.
    #[serde(default)]
    pub scale_rate: Option<f32>,
    /// JSON file holding the per-channel training mean, if the models
    /// expect zero-centered input.
    #[serde(default)]
    pub mean_file: Option<PathBuf>,

    #[serde(default)]
    pub age_model: Option<ModelSection>,
    #[serde(default)]
    pub gender_model: Option<ModelSection>,
    #[serde(default)]
    pub joint_model: Option<JointModelSection>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("cannot parse config {}: {e}", path.display()))
    }
}
