use std::path::PathBuf;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Label Universe Error: {0}")]
    Labels(#[from] LabelError),
    #[error("Asset Error: {0}")]
    Asset(#[from] AssetError),
    #[error("Replay Error: {0}")]
    Replay(#[from] ReplayError),
    #[error("Session Error: {0}")]
    Session(String),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// Label universe / classifier contract mismatches. All of these are fatal at startup.
#[derive(Error, Debug, PartialEq)]
pub enum LabelError {
    #[error("The label universe is empty")]
    Empty,
    #[error("Duplicate label in universe: {0}")]
    Duplicate(String),
    #[error("Universe has {universe} labels but the classifier outputs {classifier} classes")]
    OutputSizeMismatch { universe: usize, classifier: usize },
    #[error("Label order mismatch at index {index}: universe has '{expected}', classifier has '{found}'")]
    OrderMismatch {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("Cannot sample {rounds} distinct targets from {available} labels")]
    NotEnoughLabels { rounds: usize, available: usize },
    #[error("No label source configured (labels, labels_file or dataset_dir)")]
    NoSource,
    #[error("Failed to read label source {path}: {message}")]
    Source { path: PathBuf, message: String },
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read asset directory {0}: {1}")]
    ReadDir(PathBuf, std::io::Error),
    #[error("Failed to read font {0}: {1}")]
    ReadFont(PathBuf, std::io::Error),
    #[error("Invalid font {0}")]
    InvalidFont(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum ClassifierError {
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Classifier returned {found} scores, expected {expected}")]
    OutputSize { expected: usize, found: usize },
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Failed to read replay script {0}: {1}")]
    ReadScript(PathBuf, std::io::Error),
    #[error("Failed to parse replay script: {0}")]
    ParseScript(#[from] serde_json::Error),
    #[error("Failed to read frame directory {0}: {1}")]
    ReadFrames(PathBuf, std::io::Error),
    #[error("Failed to create output directory {0}: {1}")]
    CreateOutput(PathBuf, std::io::Error),
    #[error("Failed to write frame {0}: {1}")]
    WriteFrame(PathBuf, image::ImageError),
    #[error("Scripted confidence {confidence} for '{label}' at tick {tick} must be above {floor} and at most 1")]
    InvalidConfidence {
        tick: usize,
        label: String,
        confidence: f32,
        floor: f32,
    },
}
