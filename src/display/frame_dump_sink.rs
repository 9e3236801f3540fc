use super::DisplaySink;
use crate::error::ReplayError;
use image::RgbImage;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Headless display: optionally writes every presented frame as a PNG and
/// reports quit when its shared flag is raised (e.g. by Ctrl-C) or after a
/// frame limit.
pub struct FrameDumpSink {
    output_dir: Option<PathBuf>,
    quit: Arc<AtomicBool>,
    max_frames: Option<u64>,
    presented: u64,
}

impl FrameDumpSink {
    pub fn new(output_dir: Option<PathBuf>, max_frames: Option<u64>) -> Result<Self, ReplayError> {
        if let Some(dir) = &output_dir {
            std::fs::create_dir_all(dir).map_err(|e| ReplayError::CreateOutput(dir.clone(), e))?;
            info!("Writing composited frames to {}", dir.display());
        }
        Ok(Self {
            output_dir,
            quit: Arc::new(AtomicBool::new(false)),
            max_frames,
            presented: 0,
        })
    }

    /// Flag that makes the next `poll_quit` return true once set.
    pub fn quit_handle(&self) -> Arc<AtomicBool> {
        self.quit.clone()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    fn frame_path(&self, dir: &std::path::Path) -> PathBuf {
        dir.join(format!("frame_{:06}.png", self.presented))
    }
}

impl DisplaySink for FrameDumpSink {
    fn present(&mut self, frame: &RgbImage) {
        if let Some(dir) = &self.output_dir {
            let path = self.frame_path(dir);
            if let Err(e) = frame.save(&path) {
                let err = ReplayError::WriteFrame(path, e);
                warn!("{}", err);
            }
        }
        self.presented += 1;
    }

    fn poll_quit(&mut self) -> bool {
        if self.quit.load(Ordering::SeqCst) {
            return true;
        }
        match self.max_frames {
            Some(limit) if self.presented >= limit => {
                debug!("Frame limit {} reached", limit);
                true
            }
            _ => false,
        }
    }

    fn close(&mut self) {
        info!("Display closed after {} frames", self.presented);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_numbered_frames() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frames");
        let mut sink = FrameDumpSink::new(Some(out.clone()), None).unwrap();

        sink.present(&RgbImage::new(4, 4));
        sink.present(&RgbImage::new(4, 4));

        assert!(out.join("frame_000000.png").exists());
        assert!(out.join("frame_000001.png").exists());
        assert_eq!(sink.presented(), 2);
    }

    #[test]
    fn quit_flag_is_reported() {
        let mut sink = FrameDumpSink::new(None, None).unwrap();
        assert!(!sink.poll_quit());
        sink.quit_handle().store(true, Ordering::SeqCst);
        assert!(sink.poll_quit());
    }

    #[test]
    fn frame_limit_triggers_quit() {
        let mut sink = FrameDumpSink::new(None, Some(2)).unwrap();
        sink.present(&RgbImage::new(1, 1));
        assert!(!sink.poll_quit());
        sink.present(&RgbImage::new(1, 1));
        assert!(sink.poll_quit());
    }
}
