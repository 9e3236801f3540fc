use crate::common::Frame;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub enum FrameAcquisition {
    Available(Frame),
    /// No frame this time; the caller polls again without advancing the game.
    Unavailable,
}

/// Camera-like frame producer. Acquisition is the one place a tick may block.
#[async_trait]
pub trait VideoSource: Send {
    async fn next_frame(&mut self) -> FrameAcquisition;

    /// Frees the underlying device. Called once when the session ends.
    fn release(&mut self) {}
}
