//! Stake records and per-claim stake snapshots.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use verity_types::{ClaimId, ParticipantId, Side, StakeId, Timestamp, VrtAmount};

/// Tokens committed by one participant to one side of a claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub id: StakeId,
    pub claim_id: ClaimId,
    pub participant: ParticipantId,
    pub side: Side,
    pub amount: VrtAmount,
    pub placed_at: Timestamp,
}

/// The stakes of one claim, in insertion order.
///
/// An immutable snapshot sharing the ledger's storage: taking one clones an
/// `Arc`, and the ledger copies the list only when a stake is appended while
/// a snapshot is still alive. Iterating yields the same sequence every time
/// and stakes recorded afterwards are not visible.
#[derive(Clone, Debug, Default)]
pub struct ClaimStakes {
    stakes: Arc<Vec<Stake>>,
}

impl ClaimStakes {
    pub(crate) fn new(stakes: Arc<Vec<Stake>>) -> Self {
        Self { stakes }
    }

    #[cfg(test)]
    pub(crate) fn shares_storage_with(&self, other: &ClaimStakes) -> bool {
        Arc::ptr_eq(&self.stakes, &other.stakes)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stake> {
        self.stakes.iter()
    }

    pub fn len(&self) -> usize {
        self.stakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    pub fn as_slice(&self) -> &[Stake] {
        &self.stakes
    }
}

impl<'a> IntoIterator for &'a ClaimStakes {
    type Item = &'a Stake;
    type IntoIter = std::slice::Iter<'a, Stake>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
