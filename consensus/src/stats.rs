//! Engine activity counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use verity_types::VrtAmount;

/// Lock-free counters updated as the engine runs.
#[derive(Default)]
pub(crate) struct EngineStats {
    claims_submitted: AtomicU64,
    stakes_recorded: AtomicU64,
    stakes_rejected: AtomicU64,
    claims_resolved: AtomicU64,
    /// Raw units of every accepted stake.
    staked_raw: AtomicU64,
}

impl EngineStats {
    pub(crate) fn claim_submitted(&self) {
        self.claims_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stake_recorded(&self, amount: VrtAmount) {
        self.stakes_recorded.fetch_add(1, Ordering::Relaxed);
        let raw = u64::try_from(amount.raw()).unwrap_or(u64::MAX);
        // Saturate instead of wrapping on absurd volumes.
        let _ = self
            .staked_raw
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_add(raw))
            });
    }

    pub(crate) fn stake_rejected(&self) {
        self.stakes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn claim_resolved(&self) {
        self.claims_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            claims_submitted: self.claims_submitted.load(Ordering::Relaxed),
            stakes_recorded: self.stakes_recorded.load(Ordering::Relaxed),
            stakes_rejected: self.stakes_rejected.load(Ordering::Relaxed),
            claims_resolved: self.claims_resolved.load(Ordering::Relaxed),
            total_staked: VrtAmount::new(self.staked_raw.load(Ordering::Relaxed) as u128),
        }
    }
}

/// Point-in-time copy of the engine counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub claims_submitted: u64,
    pub stakes_recorded: u64,
    pub stakes_rejected: u64,
    pub claims_resolved: u64,
    pub total_staked: VrtAmount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = EngineStats::default();
        stats.claim_submitted();
        stats.stake_recorded(VrtAmount::from_tokens(10));
        stats.stake_recorded(VrtAmount::from_tokens(5));
        stats.stake_rejected();

        let snap = stats.snapshot();
        assert_eq!(snap.claims_submitted, 1);
        assert_eq!(snap.stakes_recorded, 2);
        assert_eq!(snap.stakes_rejected, 1);
        assert_eq!(snap.claims_resolved, 0);
        assert_eq!(snap.total_staked, VrtAmount::from_tokens(15));
    }
}
