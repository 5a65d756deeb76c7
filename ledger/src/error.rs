use thiserror::Error;
use verity_types::VrtAmount;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance {
        needed: VrtAmount,
        available: VrtAmount,
    },

    #[error("invalid amount {0}: stakes must be positive")]
    InvalidAmount(VrtAmount),

    #[error("participant {0} has no account")]
    UnknownParticipant(String),

    #[error("participant {0} already has an account")]
    AccountExists(String),
}
