//! Turn-status notices.
//!
//! A notice is published every time the turn token changes hands. It is
//! informational: the hand-off itself is the control signal.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// How a turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// The turn ran to completion and the token passed on.
    Completed,
    /// The turn was forfeited; its changes were rolled back.
    Skipped,
    /// The match ended during this turn; nobody holds the token now.
    Finished,
}

/// Published on the turn-status channel after every hand-off.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnNotice {
    /// Hand-off counter, starting at 1.
    pub turn: u64,
    /// Who finished.
    pub player: PlayerId,
    pub outcome: TurnOutcome,
    /// Human-readable summary of the turn.
    pub summary: String,
}

impl std::fmt::Display for TurnNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self.outcome {
            TurnOutcome::Completed => "completed their turn",
            TurnOutcome::Skipped => "skipped their turn",
            TurnOutcome::Finished => "ended the game",
        };
        write!(f, "[turn {}] {} {}: {}", self.turn, self.player, verb, self.summary)
    }
}
