use crate::assets::AssetTable;
use crate::config::Settings;
use crate::error::AppError;
use crate::pipeline::services::detection::{ExpressionClassifier, FaceLocator};
use crate::pipeline::types::LabelUniverse;
use tracing::info;

/// Immutable per-session context: settings, the validated label universe,
/// glyphs and the detection collaborators.
pub struct GameContext {
    settings: Settings,
    universe: LabelUniverse,
    assets: AssetTable,
    locator: Box<dyn FaceLocator>,
    classifier: Box<dyn ExpressionClassifier>,
}

impl GameContext {
    /// Fails when the universe disagrees with the classifier's output space or
    /// is too small for the configured round count. Nothing can start on a
    /// context that does not pass these checks.
    pub fn new(
        settings: Settings,
        universe: LabelUniverse,
        assets: AssetTable,
        locator: Box<dyn FaceLocator>,
        classifier: Box<dyn ExpressionClassifier>,
    ) -> Result<Self, AppError> {
        settings.validate()?;
        let output_labels = classifier.output_labels();
        universe.check_output_space(classifier.output_size(), output_labels.as_deref())?;
        universe.ensure_rounds(settings.game.rounds)?;

        info!(
            "Game context ready: {} labels, {} glyphs, {} rounds",
            universe.len(),
            assets.len(),
            settings.game.rounds
        );

        Ok(Self {
            settings,
            universe,
            assets,
            locator,
            classifier,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn universe(&self) -> &LabelUniverse {
        &self.universe
    }

    pub fn assets(&self) -> &AssetTable {
        &self.assets
    }

    pub fn locator(&self) -> &dyn FaceLocator {
        self.locator.as_ref()
    }

    pub fn classifier(&self) -> &dyn ExpressionClassifier {
        self.classifier.as_ref()
    }
}
