//! Resolution of a claim: outcome, reward pool, payouts and reputation moves.
//!
//! Everything here is a pure function of the claim's stakes and the stakers'
//! reputations at resolution time. The engine applies the result afterwards.

use crate::error::ConsensusError;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use verity_ledger::Stake;
use verity_reputation::{Reputation, ReputationChange};
use verity_types::{ClaimId, ParticipantId, ProtocolParams, Side, Timestamp, VrtAmount};

/// The settled result of one claim, produced exactly once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub claim_id: ClaimId,
    /// `true` = verified, `false` = disputed.
    pub outcome: bool,
    /// Σ tokens · reputation over Verify stakes, as f64 for reporting. The
    /// outcome is decided on the exact sums.
    pub total_weight_verify: f64,
    /// Σ tokens · reputation over Dispute stakes, as f64 for reporting.
    pub total_weight_dispute: f64,
    pub verify_total: VrtAmount,
    pub dispute_total: VrtAmount,
    /// γ · losing-side stakes.
    pub reward_pool: VrtAmount,
    /// Winning participants only; losers receive nothing.
    pub payouts: BTreeMap<ParticipantId, VrtAmount>,
    pub reputation_changes: Vec<ReputationChange>,
    /// Staked tokens not paid out, moved to the protocol reserve.
    pub retained: VrtAmount,
    pub resolved_at: Timestamp,
}

impl ResolutionRecord {
    pub fn winning_side(&self) -> Side {
        Side::from_outcome(self.outcome)
    }

    pub fn payout_total(&self) -> VrtAmount {
        self.payouts.values().copied().sum()
    }

    /// Reward for one participant; zero for losers and non-participants.
    pub fn payout(&self, participant: &ParticipantId) -> VrtAmount {
        self.payouts.get(participant).copied().unwrap_or(VrtAmount::ZERO)
    }
}

#[derive(Default)]
struct Involvement {
    won: bool,
    lost: bool,
}

/// Compute the resolution of a claim.
///
/// `reputations` supplies each staker's score at resolution time; stakers
/// missing from it count with the initial reputation.
pub fn compute_resolution(
    claim_id: ClaimId,
    stakes: &[Stake],
    reputations: &HashMap<ParticipantId, Reputation>,
    params: &ProtocolParams,
    now: Timestamp,
) -> Result<ResolutionRecord, ConsensusError> {
    if stakes.is_empty() {
        return Err(ConsensusError::NoStakes(claim_id));
    }

    let initial = Reputation::new(params.reputation_initial);
    let reputation_of = |p: &ParticipantId| reputations.get(p).copied().unwrap_or(initial);

    let mut exact_verify = BigUint::default();
    let mut exact_dispute = BigUint::default();
    let mut weight_verify = 0.0;
    let mut weight_dispute = 0.0;
    let mut verify_total = VrtAmount::ZERO;
    let mut dispute_total = VrtAmount::ZERO;
    for stake in stakes {
        let reputation = reputation_of(&stake.participant);
        let exact = exact_weight(stake.amount, reputation);
        let approx = stake.amount.as_tokens_f64() * reputation.value();
        match stake.side {
            Side::Verify => {
                exact_verify += exact;
                weight_verify += approx;
                verify_total = verify_total.saturating_add(stake.amount);
            }
            Side::Dispute => {
                exact_dispute += exact;
                weight_dispute += approx;
                dispute_total = dispute_total.saturating_add(stake.amount);
            }
        }
    }

    // An uncontested side wins outright, even at zero weight. Otherwise the
    // heavier side wins and ties go to Dispute.
    let outcome = if dispute_total.is_zero() {
        true
    } else if verify_total.is_zero() {
        false
    } else {
        exact_verify > exact_dispute
    };
    let winning = Side::from_outcome(outcome);
    let losing_total = match winning {
        Side::Verify => dispute_total,
        Side::Dispute => verify_total,
    };
    let reward_pool = losing_total.mul_bps(params.redistribution_rate_bps);

    let mut involvement: BTreeMap<ParticipantId, Involvement> = BTreeMap::new();
    for stake in stakes {
        let entry = involvement.entry(stake.participant.clone()).or_default();
        if stake.side == winning {
            entry.won = true;
        } else {
            entry.lost = true;
        }
    }

    let winners: Vec<(ParticipantId, u128)> = involvement
        .iter()
        .filter(|(_, inv)| inv.won)
        .map(|(p, _)| (p.clone(), reputation_of(p).to_micro()))
        .collect();
    let payouts = split_pool(reward_pool, &winners);

    let staked_total = verify_total.saturating_add(dispute_total);
    let paid: VrtAmount = payouts.values().copied().sum();
    let retained = staked_total.saturating_sub(paid);

    let reputation_changes = involvement
        .iter()
        .map(|(participant, inv)| {
            let before = reputation_of(participant);
            let correct = !inv.lost;
            let after = if correct {
                before.after_correct(params.reputation_gain_factor)
            } else {
                before.after_incorrect(params.reputation_loss_factor)
            };
            ReputationChange {
                participant: participant.clone(),
                before,
                after,
                correct,
            }
        })
        .collect();

    Ok(ResolutionRecord {
        claim_id,
        outcome,
        total_weight_verify: weight_verify,
        total_weight_dispute: weight_dispute,
        verify_total,
        dispute_total,
        reward_pool,
        payouts,
        reputation_changes,
        retained,
        resolved_at: now,
    })
}

/// `amount_raw · R` without rounding, scaled by 2^1074 so that every finite
/// f64 score is an integer.
fn exact_weight(amount: VrtAmount, reputation: Reputation) -> BigUint {
    let (mantissa, shift) = reputation.scaled_parts();
    (BigUint::from(amount.raw()) * BigUint::from(mantissa)) << shift
}

/// `B_i = ⌊P · R_i / ΣR_j⌋` over winners. When every winner has zero
/// reputation the pool is split evenly. Dust stays out of the payouts.
fn split_pool(pool: VrtAmount, winners: &[(ParticipantId, u128)]) -> BTreeMap<ParticipantId, VrtAmount> {
    if winners.is_empty() {
        return BTreeMap::new();
    }
    let pool_raw = pool.raw();
    let reputation_sum: u128 = winners
        .iter()
        .fold(0u128, |acc, (_, micro)| acc.saturating_add(*micro));

    if reputation_sum == 0 {
        let share = VrtAmount::new(pool_raw / winners.len() as u128);
        return winners.iter().map(|(p, _)| (p.clone(), share)).collect();
    }

    // ⌊pool·m/S⌋ = q·m + ⌊r·m/S⌋ with pool = q·S + r, which keeps the
    // intermediate products small.
    let q = pool_raw / reputation_sum;
    let r = pool_raw % reputation_sum;
    winners
        .iter()
        .map(|(p, micro)| {
            let share = q
                .saturating_mul(*micro)
                .saturating_add(r.saturating_mul(*micro) / reputation_sum);
            (p.clone(), VrtAmount::new(share))
        })
        .collect()
}
