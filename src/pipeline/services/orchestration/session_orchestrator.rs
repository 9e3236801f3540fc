use super::{sample_targets, GameContext, SessionOutcome, SessionReport, TickContext, TickStage};
use crate::common::Frame;
use crate::error::AppError;
use crate::pipeline::services::detection::FaceObserver;
use crate::pipeline::services::evaluation::MatchEvaluator;
use crate::pipeline::services::image::{Compositor, HudData};
use crate::pipeline::services::round::{
    Resolution, Round, RoundSignal, RoundState, RoundTiming, RoundTransition,
};
use crate::pipeline::types::Label;
use image::RgbImage;
use rand::Rng;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Score and progress of one game.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub targets: Vec<Label>,
    pub score: u32,
    /// 1-based number of the round most recently started; 0 before the first.
    pub round_index: usize,
}

impl Session {
    pub fn total_rounds(&self) -> usize {
        self.targets.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundAnnouncement {
    pub index: usize,
    pub total: usize,
    pub target: Label,
}

impl fmt::Display for RoundAnnouncement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Round {}/{}: mimic '{}'", self.index, self.total, self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    RoundResolved(Resolution),
}

pub struct TickOutput {
    pub frame: RgbImage,
    pub status: TickStatus,
    pub context: TickContext,
}

/// Drives rounds over a session: samples targets, feeds each frame through
/// detection, evaluation and the round state machine, keeps the score and
/// composes the displayed frame.
pub struct SessionOrchestrator<'a> {
    context: &'a GameContext,
    compositor: Compositor,
    session: Session,
    round: Option<Round>,
    aborted: Option<SessionReport>,
}

impl<'a> SessionOrchestrator<'a> {
    pub fn new<R: Rng + ?Sized>(context: &'a GameContext, rng: &mut R) -> Result<Self, AppError> {
        let targets = sample_targets(context.universe(), context.settings().game.rounds, rng)?;
        let session = Session {
            id: Uuid::new_v4(),
            targets,
            score: 0,
            round_index: 0,
        };
        info!(
            "Session {} created with targets {:?}",
            session.id,
            session.targets.iter().map(Label::as_str).collect::<Vec<_>>()
        );

        Ok(Self {
            context,
            compositor: Compositor::new(context.settings().hud.clone())?,
            session,
            round: None,
            aborted: None,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    fn round_in_progress(&self) -> bool {
        self.round.as_ref().is_some_and(|round| !round.is_resolved())
    }

    pub fn is_finished(&self) -> bool {
        if self.aborted.is_some() {
            return true;
        }
        self.session.round_index == self.session.total_rounds() && !self.round_in_progress()
    }

    /// Begins the next round at `now`. Returns `None` once every round has been played.
    pub fn start_round(&mut self, now: Duration) -> Result<Option<RoundAnnouncement>, AppError> {
        if self.aborted.is_some() {
            return Err(AppError::Session("session was aborted".into()));
        }
        if self.round_in_progress() {
            return Err(AppError::Session(format!(
                "round {} is still in progress",
                self.session.round_index
            )));
        }
        if self.session.round_index >= self.session.total_rounds() {
            return Ok(None);
        }

        let target = self.session.targets[self.session.round_index].clone();
        self.session.round_index += 1;
        let game = &self.context.settings().game;
        let timing = RoundTiming {
            round_duration: game.round_duration(),
            feedback_window: game.feedback_window(),
        };
        self.round = Some(Round::begin(
            self.session.round_index,
            target.clone(),
            now,
            timing,
        ));

        let announcement = RoundAnnouncement {
            index: self.session.round_index,
            total: self.session.total_rounds(),
            target,
        };
        info!("Starting {}", announcement);
        Ok(Some(announcement))
    }

    /// Processes one frame of the current round and returns the frame to display.
    #[instrument(skip(self, frame), fields(frame_id = %frame.frame_id()))]
    pub fn tick(&mut self, frame: &Frame, now: Duration) -> Result<TickOutput, AppError> {
        if !self.round_in_progress() {
            return Err(AppError::Session("no round in progress".into()));
        }
        let context = self.context;
        let mut tick = TickContext::new(frame.frame_id());

        let observer = FaceObserver::new(
            context.locator(),
            context.classifier(),
            context.universe(),
            &context.settings().classifier,
        );

        let stage_start = Instant::now();
        let boxes = observer.locate(frame);
        tick.metrics
            .record_duration(TickStage::Detection, stage_start.elapsed().as_micros() as u64);

        let stage_start = Instant::now();
        tick.observations = observer.classify_all(frame, &boxes);
        tick.metrics.record_duration(
            TickStage::Classification,
            stage_start.elapsed().as_micros() as u64,
        );

        let Some(round) = self.round.as_mut() else {
            return Err(AppError::Session("no round in progress".into()));
        };

        let stage_start = Instant::now();
        tick.evaluation =
            MatchEvaluator::evaluate(round.target(), &tick.observations, round.is_matched());
        tick.transition = round.advance(
            now,
            RoundSignal {
                new_match: tick.evaluation.new_match,
                quit: false,
            },
        );
        tick.metrics
            .record_duration(TickStage::Evaluation, stage_start.elapsed().as_micros() as u64);

        match tick.transition {
            RoundTransition::EnteredFeedback => {
                self.session.score += 1;
                info!(
                    "Round {} matched '{}' after {:.1}s, score {}",
                    round.index(),
                    round.target(),
                    round.elapsed(now).as_secs_f64(),
                    self.session.score
                );
            }
            RoundTransition::Resolved(resolution) => {
                info!("Round {} resolved: {:?}", round.index(), resolution);
            }
            RoundTransition::None => {}
        }

        let hud = HudData {
            round_index: round.index(),
            total_rounds: self.session.total_rounds(),
            target: round.target().clone(),
            remaining_seconds: round.remaining_seconds(now),
        };
        // The marker follows the first face matching the target while feedback lasts.
        let marked = if round.state() == RoundState::Feedback {
            tick.evaluation.first_match
        } else {
            None
        };
        let status = match round.state() {
            RoundState::Resolved(resolution) => TickStatus::RoundResolved(resolution),
            _ => TickStatus::Running,
        };

        let stage_start = Instant::now();
        let glyph = context.assets().asset_for(&hud.target);
        let composed = self.compositor.compose(
            frame.to_canvas(),
            &hud,
            glyph,
            &tick.evaluation.annotations,
            marked,
        );
        tick.metrics
            .record_duration(TickStage::Compose, stage_start.elapsed().as_micros() as u64);

        tick.metrics.finalize(tick.processing_start);
        debug!(
            "Tick: {} faces, {}us total",
            tick.observations.len(),
            tick.metrics.total_processing_duration_us
        );

        Ok(TickOutput {
            frame: composed,
            status,
            context: tick,
        })
    }

    /// Ends the session early. A round that had not resolved yet is not
    /// counted in the denominator of the reported score.
    pub fn abort(&mut self, now: Duration) -> SessionReport {
        if let Some(report) = &self.aborted {
            return report.clone();
        }

        let interrupted = match self.round.as_mut() {
            Some(round) if !round.is_resolved() => {
                round.advance(now, RoundSignal::quit());
                true
            }
            _ => false,
        };
        let attempted = if interrupted {
            self.session.round_index.saturating_sub(1)
        } else {
            self.session.round_index
        };

        let report = SessionReport {
            session_id: self.session.id,
            outcome: SessionOutcome::Aborted,
            score: self.session.score,
            rounds: attempted,
        };
        info!("Session {} aborted: {}", self.session.id, report);
        self.aborted = Some(report.clone());
        report
    }

    pub fn report(&self) -> SessionReport {
        if let Some(report) = &self.aborted {
            return report.clone();
        }
        SessionReport {
            session_id: self.session.id,
            outcome: SessionOutcome::Completed,
            score: self.session.score,
            rounds: self.session.total_rounds(),
        }
    }
}
