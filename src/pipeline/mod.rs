pub mod services;
pub mod types;

pub use services::{Compositor, GameContext, MatchEvaluator, SessionOrchestrator};
pub use types::{BoundingBox, FaceObservation, Label, LabelUniverse};
