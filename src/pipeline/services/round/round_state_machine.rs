use crate::pipeline::types::Label;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    Matched,
    TimedOut,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Active,
    /// Matched, still inside the feedback window.
    Feedback,
    Resolved(Resolution),
}

/// Inputs observed during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSignal {
    pub new_match: bool,
    pub quit: bool,
}

impl RoundSignal {
    pub fn matched() -> Self {
        Self {
            new_match: true,
            quit: false,
        }
    }

    pub fn quit() -> Self {
        Self {
            new_match: false,
            quit: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTransition {
    None,
    EnteredFeedback,
    Resolved(Resolution),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTiming {
    pub round_duration: Duration,
    pub feedback_window: Duration,
}

/// One round's lifecycle. Times are session-clock durations; `matched_at` is
/// the only record of a match, so "matched" and "has a match time" cannot
/// disagree.
#[derive(Debug, Clone)]
pub struct Round {
    index: usize,
    target: Label,
    started_at: Duration,
    matched_at: Option<Duration>,
    state: RoundState,
    timing: RoundTiming,
}

impl Round {
    pub fn begin(index: usize, target: Label, started_at: Duration, timing: RoundTiming) -> Self {
        Self {
            index,
            target,
            started_at,
            matched_at: None,
            state: RoundState::Active,
            timing,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn target(&self) -> &Label {
        &self.target
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_matched(&self) -> bool {
        self.matched_at.is_some()
    }

    pub fn matched_at(&self) -> Option<Duration> {
        self.matched_at
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, RoundState::Resolved(_))
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }

    /// Whole seconds left on the round timer, never negative.
    pub fn remaining_seconds(&self, now: Duration) -> u64 {
        self.timing
            .round_duration
            .as_secs()
            .saturating_sub(self.elapsed(now).as_secs())
    }

    /// Advances the round by one tick. Quit wins over everything else; a match
    /// reported on the tick the timer runs out still counts.
    pub fn advance(&mut self, now: Duration, signal: RoundSignal) -> RoundTransition {
        if self.is_resolved() {
            return RoundTransition::None;
        }

        if signal.quit {
            return self.resolve(Resolution::Aborted);
        }

        match self.state {
            RoundState::Active => {
                if signal.new_match {
                    self.matched_at = Some(now);
                    self.state = RoundState::Feedback;
                    RoundTransition::EnteredFeedback
                } else if self.elapsed(now) >= self.timing.round_duration {
                    self.resolve(Resolution::TimedOut)
                } else {
                    RoundTransition::None
                }
            }
            RoundState::Feedback => {
                let matched_at = self.matched_at.unwrap_or(now);
                if now.saturating_sub(matched_at) >= self.timing.feedback_window {
                    self.resolve(Resolution::Matched)
                } else {
                    RoundTransition::None
                }
            }
            RoundState::Resolved(_) => RoundTransition::None,
        }
    }

    fn resolve(&mut self, resolution: Resolution) -> RoundTransition {
        self.state = RoundState::Resolved(resolution);
        RoundTransition::Resolved(resolution)
    }
}
