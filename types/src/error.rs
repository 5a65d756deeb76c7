//! Errors raised by the shared types.

use thiserror::Error;

/// Failure to interpret a token amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount must not be negative: {0}")]
    Negative(String),

    #[error("malformed amount: {0:?}")]
    Malformed(String),

    #[error("amount {0} has more than 6 decimal places")]
    TooPrecise(String),

    #[error("amount {0} is too large")]
    Overflow(String),
}

/// A protocol parameter set that cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("redistribution rate must be within 1..=10000 bps, got {0}")]
    RedistributionRate(u32),

    #[error("{name} must be within [0, 1], got {value}")]
    Factor { name: &'static str, value: f64 },

    #[error("initial reputation must be within [0, 100], got {0}")]
    InitialReputation(f64),

    #[error("expert reputation must be within [0, 100], got {0}")]
    ExpertReputation(f64),

    #[error("minimum vote stake must be positive")]
    ZeroMinimumStake,
}
