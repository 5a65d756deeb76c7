use thiserror::Error;
use verity_ledger::LedgerError;
use verity_types::{ClaimId, ParamsError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsensusError {
    #[error("{0} has no stakes to resolve")]
    NoStakes(ClaimId),

    #[error("{0} is not open for staking")]
    ClaimNotOpen(ClaimId),

    #[error("{0} has already been resolved")]
    AlreadyResolved(ClaimId),

    #[error("{0} does not exist")]
    UnknownClaim(ClaimId),

    #[error("invalid claim: {0}")]
    InvalidClaim(String),

    #[error("participant {0} is not registered")]
    UnknownParticipant(String),

    #[error("invalid protocol parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("configuration error: {0}")]
    Config(String),
}
