pub mod game_context;
pub mod session_orchestrator;
pub mod session_report;
pub mod target_sampler;
pub mod tick_context;

pub use game_context::GameContext;
pub use session_orchestrator::{
    RoundAnnouncement, Session, SessionOrchestrator, TickOutput, TickStatus,
};
pub use session_report::{SessionOutcome, SessionReport};
pub use target_sampler::sample_targets;
pub use tick_context::{TickContext, TickMetrics, TickStage};
