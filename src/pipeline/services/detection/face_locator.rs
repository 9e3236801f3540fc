use crate::common::Frame;
use crate::pipeline::types::BoundingBox;

/// Finds faces in a frame. An empty result is a normal outcome, and a
/// detector failure should be reported the same way.
pub trait FaceLocator: Send + Sync {
    fn locate(&self, frame: &Frame) -> Vec<BoundingBox>;
}
