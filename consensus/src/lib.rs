//! Claim consensus and reward engine.
//!
//! Participants submit claims and stake tokens on whether each claim is true
//! (Verify) or false (Dispute). At resolution the engine:
//!
//! 1. Weighs every stake by the staker's *current* reputation
//!    (`W_i = S_i · R_i`) and picks the heavier side; ties go to Dispute.
//! 2. Funds a reward pool with 20% of the losing side's stakes
//!    (`P = γ · ΣS_losing`).
//! 3. Splits the pool among winning participants by reputation
//!    (`B_i = P · R_i / ΣR_winners`).
//! 4. Moves winners' reputation up and losers' reputation down.
//!
//! The whole resolution is computed before anything is mutated, then applied
//! as one unit, and each claim resolves at most once.

pub mod claim;
pub mod config;
pub mod engine;
pub mod error;
pub mod resolution;
pub mod stats;
pub mod summary;

pub use claim::{Claim, ClaimDraft, ClaimStatus};
pub use config::EngineConfig;
pub use engine::ConsensusEngine;
pub use error::ConsensusError;
pub use resolution::{compute_resolution, ResolutionRecord};
pub use stats::StatsSnapshot;
pub use summary::ParticipantSummary;
