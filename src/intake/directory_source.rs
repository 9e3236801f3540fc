use super::{FrameAcquisition, VideoSource};
use crate::common::Frame;
use crate::error::ReplayError;
use async_trait::async_trait;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Replays still images from a directory as a looping camera feed, paced at
/// a fixed frame interval. Without images it produces blank frames.
pub struct DirectoryFrameSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    frame_interval: Duration,
    ticker: Option<Interval>,
    blank_size: (u32, u32),
    released: bool,
}

impl DirectoryFrameSource {
    pub fn new(
        dir: Option<&Path>,
        frame_interval: Duration,
        blank_size: (u32, u32),
    ) -> Result<Self, ReplayError> {
        let paths = match dir {
            Some(dir) => list_images(dir)?,
            None => Vec::new(),
        };
        if paths.is_empty() {
            info!(
                "No replay frames found, using blank {}x{} frames",
                blank_size.0, blank_size.1
            );
        } else {
            info!("Replaying {} frames", paths.len());
        }
        Ok(Self {
            paths,
            cursor: 0,
            frame_interval,
            ticker: None,
            blank_size,
            released: false,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.paths.len()
    }

    async fn pace(&mut self) {
        if self.frame_interval.is_zero() {
            return;
        }
        let period = self.frame_interval;
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });
        ticker.tick().await;
    }

    fn blank_frame(&self) -> Frame {
        let (w, h) = self.blank_size;
        Frame::capture(RgbImage::from_pixel(w, h, Rgb([96, 96, 96])))
    }
}

#[async_trait]
impl VideoSource for DirectoryFrameSource {
    async fn next_frame(&mut self) -> FrameAcquisition {
        if self.released {
            return FrameAcquisition::Unavailable;
        }
        self.pace().await;

        if self.paths.is_empty() {
            return FrameAcquisition::Available(self.blank_frame());
        }

        let path = &self.paths[self.cursor];
        self.cursor = (self.cursor + 1) % self.paths.len();
        match image::open(path) {
            Ok(image) => FrameAcquisition::Available(Frame::capture(image.to_rgb8())),
            Err(e) => {
                warn!("Failed to read frame {}: {}", path.display(), e);
                FrameAcquisition::Unavailable
            }
        }
    }

    fn release(&mut self) {
        debug!("Releasing directory frame source");
        self.released = true;
        self.ticker = None;
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, ReplayError> {
    let read_err = |e| ReplayError::ReadFrames(dir.to_path_buf(), e);
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_image {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_frame(acquisition: FrameAcquisition) -> Frame {
        match acquisition {
            FrameAcquisition::Available(frame) => frame,
            FrameAcquisition::Unavailable => panic!("expected a frame"),
        }
    }

    #[tokio::test]
    async fn blank_frames_without_directory() {
        let mut source = DirectoryFrameSource::new(None, Duration::ZERO, (32, 24)).unwrap();
        let frame = expect_frame(source.next_frame().await);
        assert_eq!((frame.width(), frame.height()), (32, 24));
    }

    #[tokio::test]
    async fn cycles_images_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(4, 4, Rgb([10, 0, 0]))
            .save(dir.path().join("b.png"))
            .unwrap();
        RgbImage::from_pixel(4, 4, Rgb([20, 0, 0]))
            .save(dir.path().join("a.png"))
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source =
            DirectoryFrameSource::new(Some(dir.path()), Duration::ZERO, (8, 8)).unwrap();
        assert_eq!(source.frame_count(), 2);

        let reds: Vec<u8> = {
            let mut reds = Vec::new();
            for _ in 0..3 {
                let frame = expect_frame(source.next_frame().await);
                reds.push(frame.image().get_pixel(0, 0).0[0]);
            }
            reds
        };
        assert_eq!(reds, vec![20, 10, 20]);
    }

    #[tokio::test]
    async fn undecodable_image_is_unavailable_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"garbage").unwrap();

        let mut source =
            DirectoryFrameSource::new(Some(dir.path()), Duration::ZERO, (8, 8)).unwrap();
        assert!(matches!(source.next_frame().await, FrameAcquisition::Unavailable));
    }

    #[tokio::test]
    async fn released_source_yields_nothing() {
        let mut source = DirectoryFrameSource::new(None, Duration::from_millis(1), (8, 8)).unwrap();
        assert!(matches!(source.next_frame().await, FrameAcquisition::Available(_)));
        source.release();
        assert!(matches!(source.next_frame().await, FrameAcquisition::Unavailable));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = DirectoryFrameSource::new(
            Some(Path::new("/no/such/frames")),
            Duration::ZERO,
            (8, 8),
        );
        assert!(matches!(result, Err(ReplayError::ReadFrames(_, _))));
    }
}
