//! Per-participant profile view.

use serde::{Deserialize, Serialize};
use verity_reputation::Reputation;
use verity_types::{ParticipantId, VrtAmount};

/// Everything the engine knows about one participant, in one place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub participant: ParticipantId,
    pub balance: VrtAmount,
    pub reputation: Reputation,
    pub is_expert: bool,
    pub correct_votes: u64,
    pub total_votes: u64,
    pub total_staked: VrtAmount,
    pub total_earned: VrtAmount,
    /// Claims still open on which the participant has a stake.
    pub active_claims: usize,
}

impl ParticipantSummary {
    pub fn incorrect_votes(&self) -> u64 {
        self.total_votes.saturating_sub(self.correct_votes)
    }

    /// Share of resolved votes that were correct, in percent.
    pub fn accuracy_pct(&self) -> Option<f64> {
        if self.total_votes == 0 {
            return None;
        }
        Some(self.correct_votes as f64 / self.total_votes as f64 * 100.0)
    }
}
