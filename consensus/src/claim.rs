//! Claims and their lifecycle.

use crate::error::ConsensusError;
use serde::{Deserialize, Serialize};
use verity_types::{ClaimCategory, ClaimId, ParticipantId, Timestamp};

/// Maximum number of supporting sources attached to one claim.
pub const MAX_SOURCES: usize = 10;

/// Where a claim is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Accepting stakes.
    Open,
    /// A resolution is in progress; new stakes are refused.
    Resolving,
    /// Final. Only reward bookkeeping refers to it afterwards.
    Resolved,
}

/// What an author submits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: ClaimCategory,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ClaimDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: ClaimCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConsensusError> {
        if self.title.trim().is_empty() {
            return Err(ConsensusError::InvalidClaim("title is empty".into()));
        }
        if self.content.trim().is_empty() {
            return Err(ConsensusError::InvalidClaim("content is empty".into()));
        }
        if self.sources.len() > MAX_SOURCES {
            return Err(ConsensusError::InvalidClaim(format!(
                "{} sources given, at most {MAX_SOURCES} allowed",
                self.sources.len()
            )));
        }
        if self.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(ConsensusError::InvalidClaim("source is empty".into()));
        }
        Ok(())
    }
}

/// A submitted claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub author: ParticipantId,
    pub title: String,
    pub content: String,
    pub category: ClaimCategory,
    pub sources: Vec<String>,
    pub status: ClaimStatus,
    pub created_at: Timestamp,
    /// After this instant the claim is due for resolution.
    pub voting_deadline: Timestamp,
}

impl Claim {
    pub(crate) fn from_draft(
        id: ClaimId,
        author: ParticipantId,
        draft: ClaimDraft,
        now: Timestamp,
        voting_period_secs: u64,
    ) -> Self {
        Self {
            id,
            author,
            title: draft.title.trim().to_string(),
            content: draft.content,
            category: draft.category,
            sources: draft.sources.into_iter().map(|s| s.trim().to_string()).collect(),
            status: ClaimStatus::Open,
            created_at: now,
            voting_deadline: now.plus_secs(voting_period_secs),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == ClaimStatus::Open
    }

    /// Open and past its voting deadline.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.is_open() && now >= self.voting_deadline
    }
}
