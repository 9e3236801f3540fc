use crate::error::AssetError;
use crate::pipeline::types::{Label, LabelUniverse};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Target glyphs by label, loaded once at startup. A label without a glyph
/// is legal; the HUD simply shows no picture for it.
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    glyphs: HashMap<Label, RgbaImage>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `<dir>/<label>.png` for every label of the universe.
    pub fn load(dir: &Path, universe: &LabelUniverse) -> Result<Self, AssetError> {
        let mut table = Self::new();
        if !dir.exists() {
            warn!("Asset directory does not exist: {}", dir.display());
            return Ok(table);
        }
        if !dir.is_dir() {
            return Err(AssetError::ReadDir(
                dir.to_path_buf(),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }

        for label in universe.iter() {
            let path = dir.join(format!("{}.png", label));
            if !path.exists() {
                debug!("No glyph for label '{}' ({})", label, path.display());
                continue;
            }
            match image::open(&path) {
                Ok(image) => {
                    debug!("Loaded glyph for '{}' from {}", label, path.display());
                    table.insert(label.clone(), image.to_rgba8());
                }
                Err(e) => warn!("Failed to decode glyph {}: {}", path.display(), e),
            }
        }

        info!(
            "Loaded {} of {} glyphs from {}",
            table.len(),
            universe.len(),
            dir.display()
        );
        Ok(table)
    }

    pub fn insert(&mut self, label: Label, glyph: RgbaImage) {
        self.glyphs.insert(label, glyph);
    }

    pub fn asset_for(&self, label: &Label) -> Option<&RgbaImage> {
        self.glyphs.get(label)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn loads_present_glyphs_and_skips_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(8, 8, Rgba([255, 200, 0, 255]))
            .save(dir.path().join("happy.png"))
            .unwrap();
        std::fs::write(dir.path().join("sad.png"), b"not a png").unwrap();

        let universe = LabelUniverse::from_labels(["angry", "happy", "sad"]).unwrap();
        let table = AssetTable::load(dir.path(), &universe).unwrap();

        assert_eq!(table.len(), 1);
        let glyph = table.asset_for(&Label::from("happy")).unwrap();
        assert_eq!(glyph.get_pixel(0, 0), &Rgba([255, 200, 0, 255]));
        assert!(table.asset_for(&Label::from("sad")).is_none());
        assert!(table.asset_for(&Label::from("angry")).is_none());
    }

    #[test]
    fn missing_directory_gives_empty_table() {
        let universe = LabelUniverse::from_labels(["happy"]).unwrap();
        let table = AssetTable::load(Path::new("/definitely/not/here"), &universe).unwrap();
        assert!(table.is_empty());
    }
}
