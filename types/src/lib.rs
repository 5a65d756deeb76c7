//! Fundamental types for the Verity claim consensus engine.
//!
//! This crate defines the types shared by every other crate in the workspace:
//! identifiers, token amounts, timestamps, stake sides, claim categories and
//! the protocol parameters.

pub mod amount;
pub mod claim;
pub mod error;
pub mod id;
pub mod params;
pub mod time;

pub use amount::{VrtAmount, VRT_DECIMALS, VRT_UNIT};
pub use claim::{ClaimCategory, Side};
pub use error::{AmountError, ParamsError};
pub use id::{ClaimId, ParticipantId, StakeId};
pub use params::ProtocolParams;
pub use time::Timestamp;
