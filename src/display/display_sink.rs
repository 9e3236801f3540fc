use image::RgbImage;

/// Where composited frames go, and where the player's quit request comes from.
pub trait DisplaySink: Send {
    /// Shows a frame. Fire-and-forget: failures are logged, never returned.
    fn present(&mut self, frame: &RgbImage);

    /// True once the player asked to quit.
    fn poll_quit(&mut self) -> bool;

    fn close(&mut self) {}
}
