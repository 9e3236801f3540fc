use crate::error::AssetError;
use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::Path;
use tracing::info;

const BUNDLED_FONT: &[u8] = include_bytes!("../../../../assets/fonts/DejaVuSansMono-Bold.ttf");

/// TrueType face used for every HUD string.
#[derive(Clone)]
pub struct HudFont {
    font: FontArc,
}

impl HudFont {
    pub fn bundled() -> Result<Self, AssetError> {
        let font = FontArc::try_from_slice(BUNDLED_FONT)
            .map_err(|e| AssetError::InvalidFont(format!("bundled font: {}", e)))?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let bytes =
            std::fs::read(path).map_err(|e| AssetError::ReadFont(path.to_path_buf(), e))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| AssetError::InvalidFont(format!("{}: {}", path.display(), e)))?;
        info!("Loaded HUD font {}", path.display());
        Ok(Self { font })
    }

    /// The font at `path`, or the bundled one.
    pub fn load(path: Option<&Path>) -> Result<Self, AssetError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::bundled(),
        }
    }

    /// Rendered (width, height) of `text` at a pixel height of `size`.
    pub fn measure(&self, text: &str, size: f32) -> (i64, i64) {
        let (w, h) = text_size(PxScale::from(size), &self.font, text);
        (w as i64, h as i64)
    }

    /// Draws `text` with its top-left corner at `origin`. Pixels falling
    /// outside the canvas are dropped.
    pub fn draw(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        origin: (i64, i64),
        size: f32,
        color: [u8; 3],
    ) {
        draw_text_mut(
            canvas,
            Rgb(color),
            origin.0 as i32,
            origin.1 as i32,
            PxScale::from(size),
            &self.font,
            text,
        );
    }
}

impl std::fmt::Debug for HudFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HudFont").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 3] = [255, 255, 255];

    #[test]
    fn bundled_font_renders_text() {
        let font = HudFont::bundled().unwrap();
        let mut canvas = RgbImage::new(200, 60);
        font.draw(&mut canvas, "Round 1/5", (5, 5), 30.0, WHITE);
        assert!(canvas.pixels().any(|p| p.0 != [0, 0, 0]));
    }

    #[test]
    fn wider_text_measures_wider() {
        let font = HudFont::bundled().unwrap();
        let (short, _) = font.measure("7s", 40.0);
        let (long, _) = font.measure("10s", 40.0);
        assert!(short > 0);
        assert!(long > short);
    }

    #[test]
    fn text_past_the_edge_is_clipped() {
        let font = HudFont::bundled().unwrap();
        let mut canvas = RgbImage::new(20, 20);
        font.draw(&mut canvas, "HAPPY", (15, 10), 40.0, WHITE);
        font.draw(&mut canvas, "HAPPY", (-100, -100), 40.0, WHITE);
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let err = HudFont::load(Some(Path::new("no/such/font.ttf"))).unwrap_err();
        assert!(matches!(err, AssetError::ReadFont(..)));
    }
}
