use crate::pipeline::services::evaluation::MatchEvaluation;
use crate::pipeline::services::round::RoundTransition;
use crate::pipeline::types::FaceObservation;
use std::time::Instant;
use uuid::Uuid;

/// Everything produced while processing a single frame.
#[derive(Debug, Clone)]
pub struct TickContext {
    pub frame_id: Uuid,
    pub observations: Vec<FaceObservation>,
    pub evaluation: MatchEvaluation,
    pub transition: RoundTransition,
    pub metrics: TickMetrics,
    pub processing_start: Instant,
}

impl TickContext {
    pub fn new(frame_id: Uuid) -> Self {
        Self {
            frame_id,
            observations: Vec::new(),
            evaluation: MatchEvaluation::default(),
            transition: RoundTransition::None,
            metrics: TickMetrics::new(),
            processing_start: Instant::now(),
        }
    }
}

/// Stage timings for one tick.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    pub detection_duration_us: u64,
    pub classification_duration_us: u64,
    pub evaluation_duration_us: u64,
    pub compose_duration_us: u64,
    pub total_processing_duration_us: u64,
}

impl TickMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_duration(&mut self, stage: TickStage, duration_us: u64) {
        match stage {
            TickStage::Detection => self.detection_duration_us = duration_us,
            TickStage::Classification => self.classification_duration_us = duration_us,
            TickStage::Evaluation => self.evaluation_duration_us = duration_us,
            TickStage::Compose => self.compose_duration_us = duration_us,
        }
    }

    pub fn finalize(&mut self, start_time: Instant) {
        self.total_processing_duration_us = start_time.elapsed().as_micros() as u64;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickStage {
    Detection,
    Classification,
    Evaluation,
    Compose,
}
