use chrono::{DateTime, Utc};
use image::RgbImage;
use std::sync::Arc;
use uuid::Uuid;

/// A camera frame as delivered by the video source. The pixel buffer is
/// shared, so handing clones to the locator and classifier is cheap.
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<RgbImage>,
    captured_at: DateTime<Utc>,
    frame_id: Uuid,
}

impl Frame {
    pub fn new(image: RgbImage, captured_at: DateTime<Utc>, frame_id: Uuid) -> Self {
        Self {
            image: Arc::new(image),
            captured_at,
            frame_id,
        }
    }

    pub fn capture(image: RgbImage) -> Self {
        Self::new(image, Utc::now(), Uuid::new_v4())
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn frame_id(&self) -> Uuid {
        self.frame_id
    }

    /// Owned copy of the pixels for drawing on during this tick.
    pub fn to_canvas(&self) -> RgbImage {
        self.image.as_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn cloning_frame_shares_image_buffer() {
        let img = RgbImage::from_pixel(16, 16, Rgb([1, 2, 3]));
        let f1 = Frame::new(img, Utc::now(), Uuid::new_v4());
        let f2 = f1.clone();
        assert!(Arc::ptr_eq(&f1.image, &f2.image));
        assert_eq!(f1.frame_id(), f2.frame_id());
    }

    #[test]
    fn canvas_is_detached_from_source() {
        let frame = Frame::capture(RgbImage::from_pixel(4, 4, Rgb([9, 9, 9])));
        let mut canvas = frame.to_canvas();
        canvas.put_pixel(0, 0, Rgb([0, 0, 0]));
        assert_eq!(frame.image().get_pixel(0, 0), &Rgb([9, 9, 9]));
    }
}
