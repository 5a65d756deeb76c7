//! Stake sides and claim categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a claim a stake backs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The claim is true.
    Verify,
    /// The claim is false.
    Dispute,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Verify => Side::Dispute,
            Side::Dispute => Side::Verify,
        }
    }

    /// The side that wins for a given boolean outcome (`true` = verified).
    pub fn from_outcome(outcome: bool) -> Self {
        if outcome {
            Side::Verify
        } else {
            Side::Dispute
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Verify => f.write_str("verify"),
            Side::Dispute => f.write_str("dispute"),
        }
    }
}

/// Topic a claim is filed under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimCategory {
    BreakingNews,
    Politics,
    Science,
    Technology,
    Health,
    Climate,
    Economics,
    SocialIssues,
    Education,
    #[default]
    Other,
}

impl ClaimCategory {
    pub const ALL: [ClaimCategory; 10] = [
        ClaimCategory::BreakingNews,
        ClaimCategory::Politics,
        ClaimCategory::Science,
        ClaimCategory::Technology,
        ClaimCategory::Health,
        ClaimCategory::Climate,
        ClaimCategory::Economics,
        ClaimCategory::SocialIssues,
        ClaimCategory::Education,
        ClaimCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClaimCategory::BreakingNews => "Breaking News",
            ClaimCategory::Politics => "Politics",
            ClaimCategory::Science => "Science",
            ClaimCategory::Technology => "Technology",
            ClaimCategory::Health => "Health",
            ClaimCategory::Climate => "Climate",
            ClaimCategory::Economics => "Economics",
            ClaimCategory::SocialIssues => "Social Issues",
            ClaimCategory::Education => "Education",
            ClaimCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ClaimCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
