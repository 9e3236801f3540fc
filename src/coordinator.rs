use crate::{
    common::{Clock, SystemClock},
    display::DisplaySink,
    error::AppError,
    intake::{FrameAcquisition, VideoSource},
    pipeline::services::orchestration::{
        GameContext, SessionOrchestrator, SessionReport, TickStatus,
    },
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs one game session end to end: acquires frames, ticks the session,
/// presents the result and handles quit and the pause between rounds.
pub struct Coordinator {
    context: GameContext,
    source: Box<dyn VideoSource>,
    sink: Box<dyn DisplaySink>,
    clock: Arc<dyn Clock>,
    rng: StdRng,
}

impl Coordinator {
    pub async fn run(self) -> Result<SessionReport, AppError> {
        let Coordinator {
            context,
            mut source,
            mut sink,
            clock,
            mut rng,
        } = self;

        let result = Self::play(
            &context,
            source.as_mut(),
            sink.as_mut(),
            clock.as_ref(),
            &mut rng,
        )
        .await;

        source.release();
        sink.close();
        result
    }

    async fn play(
        context: &GameContext,
        source: &mut dyn VideoSource,
        sink: &mut dyn DisplaySink,
        clock: &dyn Clock,
        rng: &mut StdRng,
    ) -> Result<SessionReport, AppError> {
        let mut orchestrator = SessionOrchestrator::new(context, rng)?;
        let pause = context.settings().game.inter_round_pause();

        match orchestrator.start_round(clock.now())? {
            Some(announcement) => println!("{}", announcement),
            None => return Ok(orchestrator.report()),
        }

        loop {
            let frame = match source.next_frame().await {
                FrameAcquisition::Available(frame) => frame,
                FrameAcquisition::Unavailable => {
                    debug!("No frame available");
                    if sink.poll_quit() {
                        return Ok(orchestrator.abort(clock.now()));
                    }
                    tokio::task::yield_now().await;
                    continue;
                }
            };

            let output = orchestrator.tick(&frame, clock.now())?;
            sink.present(&output.frame);

            // A game whose last round just resolved is complete, quit or not.
            let resolved = matches!(output.status, TickStatus::RoundResolved(_));
            if resolved && orchestrator.is_finished() {
                break;
            }

            if sink.poll_quit() {
                return Ok(orchestrator.abort(clock.now()));
            }

            if let TickStatus::RoundResolved(resolution) = output.status {
                debug!("Round resolved with {:?}", resolution);
                if !pause.is_zero() {
                    tokio::time::sleep(pause).await;
                }
                match orchestrator.start_round(clock.now())? {
                    Some(announcement) => println!("{}", announcement),
                    None => break,
                }
            }
        }

        let report = orchestrator.report();
        info!("Session {} finished: {}", report.session_id, report);
        Ok(report)
    }
}

pub struct CoordinatorBuilder {
    context: Option<GameContext>,
    source: Option<Box<dyn VideoSource>>,
    sink: Option<Box<dyn DisplaySink>>,
    clock: Option<Arc<dyn Clock>>,
    seed: Option<u64>,
}

impl CoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            context: None,
            source: None,
            sink: None,
            clock: None,
            seed: None,
        }
    }

    pub fn context(mut self, context: GameContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn video_source(mut self, source: Box<dyn VideoSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn display_sink(mut self, sink: Box<dyn DisplaySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    // Defaults to the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    // Overrides the seed from the game settings.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Coordinator, AppError> {
        let context = self
            .context
            .ok_or(AppError::Session("Game context not set".to_string()))?;
        let source = self
            .source
            .ok_or(AppError::Session("Video source not set".to_string()))?;
        let sink = self
            .sink
            .ok_or(AppError::Session("Display sink not set".to_string()))?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        let rng = match self.seed.or(context.settings().game.seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Coordinator {
            context,
            source,
            sink,
            clock,
            rng,
        })
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
