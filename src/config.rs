use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top level settings, layered from defaults, an optional TOML file and
/// `MIMIC__*` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameSettings,
    pub classifier: ClassifierSettings,
    pub hud: HudSettings,
    pub labels: LabelSettings,
    pub replay: ReplaySettings,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub rounds: usize,
    pub round_seconds: u64,
    pub feedback_seconds: f64,
    pub inter_round_pause_ms: u64,
    /// Fixed seed for target sampling; random when unset.
    pub seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            rounds: 5,
            round_seconds: 10,
            feedback_seconds: 2.0,
            inter_round_pause_ms: 500,
            seed: None,
        }
    }
}

impl GameSettings {
    pub fn round_duration(&self) -> Duration {
        Duration::from_secs(self.round_seconds)
    }

    /// Saturates instead of panicking on values `Settings::validate` rejects.
    pub fn feedback_window(&self) -> Duration {
        match Duration::try_from_secs_f64(self.feedback_seconds) {
            Ok(window) => window,
            Err(_) if self.feedback_seconds > 0.0 => Duration::MAX,
            Err(_) => Duration::ZERO,
        }
    }

    pub fn inter_round_pause(&self) -> Duration {
        Duration::from_millis(self.inter_round_pause_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Face crops are resized to a `crop_size` x `crop_size` square before classification.
    pub crop_size: u32,
    /// Predictions whose best score is below this are dropped.
    pub min_confidence: Option<f32>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            crop_size: 128,
            min_confidence: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HudSettings {
    pub panel: PanelRect,
    /// Weight of the dark panel; the frame keeps `1 - panel_weight`.
    pub panel_weight: f32,
    pub glyph_margin: u32,
    /// Pixel height of the progress and target lines.
    pub text_size: f32,
    /// Pixel height of the centered countdown.
    pub countdown_size: f32,
    /// TrueType font for the HUD; the bundled DejaVu Sans Mono Bold when unset.
    pub font_path: Option<PathBuf>,
    pub progress_origin: (i64, i64),
    pub target_origin: (i64, i64),
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            panel: PanelRect {
                x: 10,
                y: 10,
                width: 620,
                height: 90,
            },
            panel_weight: 0.6,
            glyph_margin: 10,
            text_size: 30.0,
            countdown_size: 72.0,
            font_path: None,
            progress_origin: (20, 20),
            target_origin: (20, 60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    /// Explicit, ordered label universe. Takes priority over the other sources.
    pub labels: Vec<String>,
    /// Classifier metadata JSON of the form `{"labels": [...]}`.
    pub labels_file: Option<PathBuf>,
    /// Training dataset root; its sorted sub-directory names are the labels.
    pub dataset_dir: Option<PathBuf>,
    pub assets_dir: PathBuf,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            labels_file: None,
            dataset_dir: None,
            assets_dir: PathBuf::from("emojis"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    pub script: Option<PathBuf>,
    pub frames_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub frame_interval_ms: u64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub max_frames: Option<u64>,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            script: None,
            frames_dir: None,
            output_dir: None,
            frame_interval_ms: 33,
            frame_width: 640,
            frame_height: 480,
            max_frames: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
        } else {
            builder = builder.add_source(config::File::with_name("mimic").required(false));
        }
        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix("MIMIC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.rounds == 0 {
            return Err(ConfigError::invalid("game.rounds", "must be greater than 0"));
        }
        if self.game.round_seconds == 0 {
            return Err(ConfigError::invalid(
                "game.round_seconds",
                "must be greater than 0",
            ));
        }
        if !(self.game.feedback_seconds > 0.0
            && Duration::try_from_secs_f64(self.game.feedback_seconds).is_ok())
        {
            return Err(ConfigError::invalid(
                "game.feedback_seconds",
                "must be a positive, representable number of seconds",
            ));
        }
        if self.classifier.crop_size == 0 {
            return Err(ConfigError::invalid(
                "classifier.crop_size",
                "must be greater than 0",
            ));
        }
        if let Some(min) = self.classifier.min_confidence {
            if !(0.0..=1.0).contains(&min) {
                return Err(ConfigError::invalid(
                    "classifier.min_confidence",
                    "must be between 0.0 and 1.0",
                ));
            }
        }
        if self.hud.panel.width == 0 || self.hud.panel.height == 0 {
            return Err(ConfigError::invalid("hud.panel", "panel must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.hud.panel_weight) {
            return Err(ConfigError::invalid(
                "hud.panel_weight",
                "must be between 0.0 and 1.0",
            ));
        }
        for (field, size) in [
            ("hud.text_size", self.hud.text_size),
            ("hud.countdown_size", self.hud.countdown_size),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return Err(ConfigError::invalid(field, "must be a positive pixel size"));
            }
        }
        if self.replay.frame_width == 0 || self.replay.frame_height == 0 {
            return Err(ConfigError::invalid(
                "replay.frame_width/frame_height",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}
