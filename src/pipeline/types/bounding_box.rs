use serde::{Deserialize, Serialize};

/// Axis-aligned face region in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The part of the box inside a `frame_width` x `frame_height` frame, or
    /// `None` when nothing of it is visible.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<BoundingBox> {
        let right = self.right().min(frame_width);
        let bottom = self.bottom().min(frame_height);
        if self.x >= right || self.y >= bottom {
            return None;
        }
        Some(BoundingBox::new(self.x, self.y, right - self.x, bottom - self.y))
    }
}
