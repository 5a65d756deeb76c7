//! TOML scenarios: a cast of participants, the claims they post, and the
//! stakes and resolutions to replay against an engine.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use verity_consensus::{
    ClaimDraft, ConsensusEngine, ParticipantSummary, ResolutionRecord, StatsSnapshot,
};
use verity_reputation::Reputation;
use verity_types::{ClaimCategory, ClaimId, ParticipantId, Side, Timestamp, VrtAmount};

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    /// Clock at the first step, in Unix seconds. Defaults to the wall clock.
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub participants: Vec<ParticipantSpec>,
    #[serde(default)]
    pub claims: Vec<ClaimSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ParticipantSpec {
    pub id: ParticipantId,
    pub balance: VrtAmount,
    /// Starting reputation; the protocol's initial score when omitted.
    #[serde(default)]
    pub reputation: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClaimSpec {
    pub author: ParticipantId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: ClaimCategory,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// One action. Claims are referenced by their position in `claims`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Stake {
        claim: usize,
        participant: ParticipantId,
        side: Side,
        amount: VrtAmount,
    },
    Vote {
        claim: usize,
        participant: ParticipantId,
        side: Side,
    },
    Resolve {
        claim: usize,
    },
    /// Move the clock forward.
    Advance {
        secs: u64,
    },
    ResolveExpired,
}

/// A step the engine refused. Replay continues past it.
#[derive(Clone, Debug, Serialize)]
pub struct StepFailure {
    pub step: usize,
    pub error: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub resolutions: Vec<ResolutionRecord>,
    pub failures: Vec<StepFailure>,
    pub participants: Vec<ParticipantSummary>,
    pub stats: StatsSnapshot,
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let scenario: Self = toml::from_str(s)?;
        for (i, step) in scenario.steps.iter().enumerate() {
            let claim = match step {
                Step::Stake { claim, .. } | Step::Vote { claim, .. } | Step::Resolve { claim } => {
                    *claim
                }
                Step::Advance { .. } | Step::ResolveExpired => continue,
            };
            if claim >= scenario.claims.len() {
                bail!(
                    "step {i} refers to claim {claim}, but only {} are declared",
                    scenario.claims.len()
                );
            }
        }
        Ok(scenario)
    }

    /// Replay the scenario.
    ///
    /// Setup (accounts and claims) must succeed; refused steps are collected
    /// in the report instead of aborting.
    pub fn run(&self, engine: &ConsensusEngine) -> anyhow::Result<Report> {
        let mut now = self.start.map(Timestamp::new).unwrap_or_else(Timestamp::now);

        for p in &self.participants {
            engine
                .open_account(p.id.clone(), p.balance)
                .with_context(|| format!("cannot open account for {}", p.id))?;
            if let Some(score) = p.reputation {
                engine.reputation().insert(p.id.clone(), Reputation::new(score));
            }
        }

        let mut claim_ids: Vec<ClaimId> = Vec::with_capacity(self.claims.len());
        for (i, claim) in self.claims.iter().enumerate() {
            let draft = ClaimDraft {
                title: claim.title.clone(),
                content: claim.content.clone(),
                category: claim.category,
                sources: claim.sources.clone(),
            };
            let id = engine
                .submit_claim(&claim.author, draft, now)
                .with_context(|| format!("cannot submit claim {i}"))?;
            claim_ids.push(id);
        }

        let mut resolutions = Vec::new();
        let mut failures = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            let result = match step {
                Step::Stake { claim, participant, side, amount } => engine
                    .place_stake(claim_ids[*claim], participant, *side, *amount, now)
                    .map(|_| ()),
                Step::Vote { claim, participant, side } => engine
                    .cast_vote(claim_ids[*claim], participant, *side, now)
                    .map(|_| ()),
                Step::Resolve { claim } => engine
                    .resolve(claim_ids[*claim], now)
                    .map(|record| resolutions.push(record)),
                Step::Advance { secs } => {
                    now = now.plus_secs(*secs);
                    Ok(())
                }
                Step::ResolveExpired => {
                    for (claim, result) in engine.resolve_expired(now) {
                        match result {
                            Ok(record) => resolutions.push(record),
                            Err(e) => failures.push(StepFailure {
                                step: i,
                                error: format!("{claim}: {e}"),
                            }),
                        }
                    }
                    Ok(())
                }
            };
            if let Err(e) = result {
                tracing::debug!(step = i, error = %e, "scenario step refused");
                failures.push(StepFailure { step: i, error: e.to_string() });
            }
        }

        let participants = self
            .participants
            .iter()
            .map(|p| engine.participant_summary(&p.id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Report {
            resolutions,
            failures,
            participants,
            stats: engine.stats(),
        })
    }
}
