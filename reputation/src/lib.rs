//! Participant reputation.
//!
//! Every participant carries a score in `[0, 100]`, starting at 50. After each
//! resolved claim the score moves toward 100 for a correct vote
//! (`R' = R + 0.05 · (100 − R)`) and shrinks for an incorrect one
//! (`R' = 0.9 · R`). Scores weight votes and rewards in the consensus engine.

pub mod error;
pub mod score;
pub mod store;

pub use error::ReputationError;
pub use score::Reputation;
pub use store::{ReputationChange, ReputationRecord, ReputationStore};
