use serde::Serialize;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionOutcome {
    Completed,
    Aborted,
}

/// Final score line of a session. For a completed game `rounds` is the round
/// count; for an aborted one it is the number of rounds attempted before the
/// round that was interrupted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub outcome: SessionOutcome,
    pub score: u32,
    pub rounds: usize,
}

impl SessionReport {
    pub fn exit_code(&self) -> u8 {
        match self.outcome {
            SessionOutcome::Completed => 0,
            SessionOutcome::Aborted => 130,
        }
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            SessionOutcome::Completed => {
                write!(f, "Game over! Final score: {}/{}", self.score, self.rounds)
            }
            SessionOutcome::Aborted => {
                write!(f, "Game interrupted. Your score: {}/{}", self.score, self.rounds)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_lines() {
        let completed = SessionReport {
            session_id: Uuid::nil(),
            outcome: SessionOutcome::Completed,
            score: 3,
            rounds: 5,
        };
        assert_eq!(completed.to_string(), "Game over! Final score: 3/5");
        assert_eq!(completed.exit_code(), 0);

        let aborted = SessionReport {
            outcome: SessionOutcome::Aborted,
            score: 2,
            rounds: 2,
            ..completed
        };
        assert_eq!(aborted.to_string(), "Game interrupted. Your score: 2/2");
        assert_eq!(aborted.exit_code(), 130);
    }
}
