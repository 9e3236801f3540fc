pub mod assets;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod replay;

pub use config::Settings;
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use error::{AppError, ClassifierError, ConfigError, LabelError, ReplayError};
pub use pipeline::services::orchestration::{SessionOutcome, SessionReport};
