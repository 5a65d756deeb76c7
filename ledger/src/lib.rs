//! Stake ledger.
//!
//! Holds participant balances and the stakes placed on claims. Every balance
//! mutation for a participant runs under that participant's own lock, so
//! concurrent stakes by the same participant cannot lose updates while
//! different participants proceed in parallel. A stake debits the balance and
//! appends the stake record as one step: both happen or neither does.

pub mod account;
pub mod error;
pub mod ledger;
pub mod stake;

pub use account::AccountInfo;
pub use error::LedgerError;
pub use ledger::StakeLedger;
pub use stake::{ClaimStakes, Stake};
