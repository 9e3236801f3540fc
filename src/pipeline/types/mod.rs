mod bounding_box;
mod face_observation;
mod label;

pub use bounding_box::BoundingBox;
pub use face_observation::FaceObservation;
pub use label::{Label, LabelUniverse};
