//! Per-participant balance bookkeeping.

use serde::{Deserialize, Serialize};
use verity_types::VrtAmount;

/// A participant's account as seen by readers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Spendable tokens. Never negative.
    pub balance: VrtAmount,
    /// Sum of every stake this participant has placed.
    pub total_staked: VrtAmount,
    /// Sum of every reward credited to this participant.
    pub total_earned: VrtAmount,
}

impl AccountInfo {
    pub(crate) fn with_balance(balance: VrtAmount) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }
}

