use super::{BoundingBox, Label};

/// One located and classified face. Rebuilt every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceObservation {
    pub bounds: BoundingBox,
    pub label: Label,
    pub confidence: Option<f32>,
}

impl FaceObservation {
    pub fn new(bounds: BoundingBox, label: Label) -> Self {
        Self {
            bounds,
            label,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
