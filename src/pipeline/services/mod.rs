pub mod detection;
pub mod evaluation;
pub mod image;
pub mod orchestration;
pub mod round;

pub use evaluation::MatchEvaluator;
pub use image::Compositor;
pub use orchestration::{GameContext, SessionOrchestrator};
