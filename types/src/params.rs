//! Protocol constants and the parameter set built from them.
//!
//! The constants are the fixed protocol values. `ProtocolParams` carries the
//! same values as data so test networks and simulations can load a variant
//! from TOML; its `Default` is always the constants below.

use crate::amount::VrtAmount;
use crate::error::ParamsError;
use serde::{Deserialize, Serialize};

/// Minimum tokens committed by a one-click vote.
pub const MIN_VOTE_STAKE: VrtAmount = VrtAmount::from_tokens(10);

/// Tokens debited from the author to submit a claim.
pub const POST_COST: VrtAmount = VrtAmount::from_tokens(1);

/// Share of the losing side's stakes redistributed to winners (γ).
pub const REDISTRIBUTION_RATE: f64 = 0.2;

/// [`REDISTRIBUTION_RATE`] in basis points, the form used for arithmetic.
pub const REDISTRIBUTION_RATE_BPS: u32 = 2_000;

/// Reputation assigned to a participant on first sight.
pub const REPUTATION_INITIAL: f64 = 50.0;

/// Fraction of the remaining headroom gained on a correct vote.
pub const REPUTATION_GAIN_FACTOR: f64 = 0.05;

/// Fraction of current reputation lost on an incorrect vote.
pub const REPUTATION_LOSS_FACTOR: f64 = 0.1;

pub const REPUTATION_MIN: f64 = 0.0;
pub const REPUTATION_MAX: f64 = 100.0;

/// Reputation at which a participant counts as an expert verifier.
pub const EXPERT_REPUTATION: f64 = 90.0;

/// How long a claim stays open before it becomes due for resolution.
pub const CLAIM_VOTING_PERIOD_SECS: u64 = 7 * 24 * 3600;

/// All protocol parameters used by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    /// Stake committed by `cast_vote`.
    pub min_vote_stake: VrtAmount,
    /// Fee debited on claim submission.
    pub post_cost: VrtAmount,
    /// γ in basis points (2000 = 20%).
    pub redistribution_rate_bps: u32,
    pub reputation_initial: f64,
    pub reputation_gain_factor: f64,
    pub reputation_loss_factor: f64,
    pub expert_reputation: f64,
    /// Seconds between claim submission and its voting deadline.
    pub claim_voting_period_secs: u64,
}

impl ProtocolParams {
    /// Check every field is inside the range the formulas are defined for.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.redistribution_rate_bps == 0 || self.redistribution_rate_bps > 10_000 {
            return Err(ParamsError::RedistributionRate(self.redistribution_rate_bps));
        }
        for (name, value) in [
            ("reputation_gain_factor", self.reputation_gain_factor),
            ("reputation_loss_factor", self.reputation_loss_factor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParamsError::Factor { name, value });
            }
        }
        if !(REPUTATION_MIN..=REPUTATION_MAX).contains(&self.reputation_initial) {
            return Err(ParamsError::InitialReputation(self.reputation_initial));
        }
        if !(REPUTATION_MIN..=REPUTATION_MAX).contains(&self.expert_reputation) {
            return Err(ParamsError::ExpertReputation(self.expert_reputation));
        }
        if self.min_vote_stake.is_zero() {
            return Err(ParamsError::ZeroMinimumStake);
        }
        Ok(())
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            min_vote_stake: MIN_VOTE_STAKE,
            post_cost: POST_COST,
            redistribution_rate_bps: REDISTRIBUTION_RATE_BPS,
            reputation_initial: REPUTATION_INITIAL,
            reputation_gain_factor: REPUTATION_GAIN_FACTOR,
            reputation_loss_factor: REPUTATION_LOSS_FACTOR,
            expert_reputation: EXPERT_REPUTATION,
            claim_voting_period_secs: CLAIM_VOTING_PERIOD_SECS,
        }
    }
}
