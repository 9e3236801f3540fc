use super::alpha_blend::{blend_panel, overlay_alpha};
use super::font::HudFont;
use super::shapes::{draw_box, draw_check_mark};
use crate::config::HudSettings;
use crate::error::AssetError;
use crate::pipeline::services::evaluation::{AnnotationColor, FaceAnnotation};
use crate::pipeline::types::Label;
use image::{RgbImage, RgbaImage};

const PANEL_COLOR: [u8; 3] = [0, 0, 0];
const PROGRESS_COLOR: [u8; 3] = [255, 255, 0];
const TARGET_COLOR: [u8; 3] = [255, 255, 255];
const COUNTDOWN_COLOR: [u8; 3] = [255, 255, 0];
const BOX_THICKNESS: u32 = 2;
const MARKER_GAP: i64 = 5;

/// What the HUD shows for the current tick.
#[derive(Debug, Clone, PartialEq)]
pub struct HudData {
    pub round_index: usize,
    pub total_rounds: usize,
    pub target: Label,
    pub remaining_seconds: u64,
}

impl HudData {
    pub fn progress_text(&self) -> String {
        format!("Round {}/{}", self.round_index, self.total_rounds)
    }

    pub fn target_text(&self) -> String {
        format!("Mimic: {}", self.target.display_name())
    }

    pub fn countdown_text(&self) -> String {
        format!("{}s", self.remaining_seconds)
    }
}

/// Turns a raw camera frame into the frame shown to the player.
#[derive(Debug, Clone)]
pub struct Compositor {
    layout: HudSettings,
    font: HudFont,
}

impl Compositor {
    pub fn new(layout: HudSettings) -> Result<Self, AssetError> {
        let font = HudFont::load(layout.font_path.as_deref())?;
        Ok(Self { layout, font })
    }

    pub fn layout(&self) -> &HudSettings {
        &self.layout
    }

    /// Runs every drawing step over a canvas owned by this tick. `marked` is
    /// the annotation that gets the affirmative marker, if any.
    pub fn compose(
        &self,
        mut canvas: RgbImage,
        hud: &HudData,
        glyph: Option<&RgbaImage>,
        annotations: &[FaceAnnotation],
        marked: Option<usize>,
    ) -> RgbImage {
        self.draw_panel(&mut canvas);
        self.draw_hud_text(&mut canvas, hud);
        if let Some(glyph) = glyph {
            self.draw_glyph(&mut canvas, glyph);
        }
        self.draw_annotations(&mut canvas, annotations, marked);
        canvas
    }

    pub fn draw_panel(&self, canvas: &mut RgbImage) {
        blend_panel(canvas, &self.layout.panel, PANEL_COLOR, self.layout.panel_weight);
    }

    pub fn draw_hud_text(&self, canvas: &mut RgbImage, hud: &HudData) {
        self.font.draw(
            canvas,
            &hud.progress_text(),
            self.layout.progress_origin,
            self.layout.text_size,
            PROGRESS_COLOR,
        );
        self.font.draw(
            canvas,
            &hud.target_text(),
            self.layout.target_origin,
            self.layout.text_size,
            TARGET_COLOR,
        );

        let countdown = hud.countdown_text();
        let size = self.layout.countdown_size;
        let (width, height) = self.font.measure(&countdown, size);
        let origin = (
            canvas.width() as i64 / 2 - width / 2,
            canvas.height() as i64 / 2 - height / 2,
        );
        self.font.draw(canvas, &countdown, origin, size, COUNTDOWN_COLOR);
    }

    /// Places the target glyph in the top-right corner. Returns whether it fit.
    pub fn draw_glyph(&self, canvas: &mut RgbImage, glyph: &RgbaImage) -> bool {
        let margin = self.layout.glyph_margin as i64;
        let x = canvas.width() as i64 - glyph.width() as i64 - margin;
        overlay_alpha(canvas, glyph, x, margin)
    }

    /// Boxes every face in its decided color. The check marker goes only
    /// beside `annotations[marked]`, and only if that face matches the target.
    pub fn draw_annotations(
        &self,
        canvas: &mut RgbImage,
        annotations: &[FaceAnnotation],
        marked: Option<usize>,
    ) {
        for (index, annotation) in annotations.iter().enumerate() {
            let bounds = &annotation.bounds;
            draw_box(canvas, bounds, BOX_THICKNESS, annotation.color.rgb());

            if marked == Some(index) && annotation.matches_target() {
                let anchor = (
                    bounds.right() as i64 + MARKER_GAP,
                    bounds.y as i64 + bounds.height as i64 / 2,
                );
                let size = (bounds.height / 3).max(12);
                draw_check_mark(canvas, anchor, size, AnnotationColor::Affirmative.rgb());
            }
        }
    }
}
