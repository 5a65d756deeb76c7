//! Thread-safe store of per-participant reputation.

use crate::error::ReputationError;
use crate::score::Reputation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use verity_types::{ParticipantId, ProtocolParams};

/// Everything the store knows about one participant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub score: Reputation,
    pub correct_votes: u64,
    pub incorrect_votes: u64,
}

impl ReputationRecord {
    fn fresh(score: Reputation) -> Self {
        Self {
            score,
            correct_votes: 0,
            incorrect_votes: 0,
        }
    }

    pub fn total_votes(&self) -> u64 {
        self.correct_votes + self.incorrect_votes
    }
}

/// A score transition computed for one participant at claim resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReputationChange {
    pub participant: ParticipantId,
    pub before: Reputation,
    pub after: Reputation,
    pub correct: bool,
}

/// Holds the current reputation of every participant seen so far.
pub struct ReputationStore {
    records: RwLock<HashMap<ParticipantId, ReputationRecord>>,
    initial: Reputation,
    gain_factor: f64,
    loss_factor: f64,
    expert_threshold: f64,
}

impl ReputationStore {
    /// Create an empty store using the default protocol factors.
    pub fn new() -> Self {
        Self::with_params(&ProtocolParams::default())
    }

    pub fn with_params(params: &ProtocolParams) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            initial: Reputation::new(params.reputation_initial),
            gain_factor: params.reputation_gain_factor,
            loss_factor: params.reputation_loss_factor,
            expert_threshold: params.expert_reputation,
        }
    }

    /// Current score, or the initial score for an unseen participant.
    pub fn get(&self, participant: &ParticipantId) -> Reputation {
        self.read()
            .get(participant)
            .map(|r| r.score)
            .unwrap_or(self.initial)
    }

    /// Current score, failing if the participant was never recorded.
    pub fn get_existing(&self, participant: &ParticipantId) -> Result<Reputation, ReputationError> {
        self.read()
            .get(participant)
            .map(|r| r.score)
            .ok_or_else(|| ReputationError::UnknownParticipant(participant.to_string()))
    }

    pub fn record(&self, participant: &ParticipantId) -> Option<ReputationRecord> {
        self.read().get(participant).copied()
    }

    /// Seed or overwrite a participant's score, keeping their vote counts.
    pub fn insert(&self, participant: ParticipantId, score: Reputation) {
        let mut records = self.write();
        records
            .entry(participant)
            .and_modify(|r| r.score = score)
            .or_insert_with(|| ReputationRecord::fresh(score));
    }

    /// Make sure a participant has a record, starting at the initial score.
    pub fn ensure(&self, participant: &ParticipantId) {
        let mut records = self.write();
        if !records.contains_key(participant) {
            records.insert(participant.clone(), ReputationRecord::fresh(self.initial));
        }
    }

    /// The score a participant would move to after a vote, without storing it.
    pub fn next_score(&self, current: Reputation, was_correct: bool) -> Reputation {
        if was_correct {
            current.after_correct(self.gain_factor)
        } else {
            current.after_incorrect(self.loss_factor)
        }
    }

    /// Apply one vote outcome and persist the new score.
    pub fn apply_outcome(&self, participant: &ParticipantId, was_correct: bool) -> Reputation {
        let mut records = self.write();
        let record = records
            .entry(participant.clone())
            .or_insert_with(|| ReputationRecord::fresh(self.initial));
        let before = record.score;
        record.score = self.next_score(before, was_correct);
        if was_correct {
            record.correct_votes += 1;
        } else {
            record.incorrect_votes += 1;
        }
        tracing::debug!(%participant, %before, after = %record.score, was_correct, "reputation updated");
        record.score
    }

    /// Read the scores of many participants under a single lock.
    pub fn snapshot<'a>(
        &self,
        participants: impl IntoIterator<Item = &'a ParticipantId>,
    ) -> HashMap<ParticipantId, Reputation> {
        let records = self.read();
        participants
            .into_iter()
            .map(|p| {
                let score = records.get(p).map(|r| r.score).unwrap_or(self.initial);
                (p.clone(), score)
            })
            .collect()
    }

    /// Persist precomputed changes as one unit: no reader observes a subset.
    pub fn commit(&self, changes: &[ReputationChange]) {
        let mut records = self.write();
        for change in changes {
            let record = records
                .entry(change.participant.clone())
                .or_insert_with(|| ReputationRecord::fresh(self.initial));
            record.score = change.after;
            if change.correct {
                record.correct_votes += 1;
            } else {
                record.incorrect_votes += 1;
            }
        }
    }

    pub fn is_expert(&self, participant: &ParticipantId) -> bool {
        self.get(participant).value() >= self.expert_threshold
    }

    /// Number of participants with a record.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<ParticipantId, ReputationRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<ParticipantId, ReputationRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ReputationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> ParticipantId {
        ParticipantId::new("alice")
    }

    #[test]
    fn unseen_participant_defaults_to_fifty() {
        let store = ReputationStore::new();
        assert_eq!(store.get(&alice()).value(), 50.0);
        assert!(store.is_empty());
    }

    #[test]
    fn strict_lookup_rejects_unseen_participant() {
        let store = ReputationStore::new();
        assert_eq!(
            store.get_existing(&alice()),
            Err(ReputationError::UnknownParticipant("alice".into()))
        );
        store.ensure(&alice());
        assert_eq!(store.get_existing(&alice()).unwrap().value(), 50.0);
    }

    #[test]
    fn apply_outcome_persists_and_counts_votes() {
        let store = ReputationStore::new();
        assert_eq!(store.apply_outcome(&alice(), true).value(), 52.5);
        assert_eq!(store.get(&alice()).value(), 52.5);
        store.apply_outcome(&alice(), false);

        let record = store.record(&alice()).unwrap();
        assert_eq!(record.correct_votes, 1);
        assert_eq!(record.incorrect_votes, 1);
        assert_eq!(record.total_votes(), 2);
        assert_eq!(record.score.value(), 52.5 * 0.9);
    }

    #[test]
    fn insert_keeps_vote_counts() {
        let store = ReputationStore::new();
        store.apply_outcome(&alice(), true);
        store.insert(alice(), Reputation::new(80.0));
        let record = store.record(&alice()).unwrap();
        assert_eq!(record.score.value(), 80.0);
        assert_eq!(record.correct_votes, 1);
    }

    #[test]
    fn snapshot_fills_in_initial_scores() {
        let store = ReputationStore::new();
        store.insert(alice(), Reputation::new(80.0));
        let bob = ParticipantId::new("bob");
        let snap = store.snapshot([&alice(), &bob]);
        assert_eq!(snap[&alice()].value(), 80.0);
        assert_eq!(snap[&bob].value(), 50.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn commit_applies_every_change() {
        let store = ReputationStore::new();
        let bob = ParticipantId::new("bob");
        store.commit(&[
            ReputationChange {
                participant: alice(),
                before: Reputation::new(50.0),
                after: Reputation::new(45.0),
                correct: false,
            },
            ReputationChange {
                participant: bob.clone(),
                before: Reputation::new(50.0),
                after: Reputation::new(52.5),
                correct: true,
            },
        ]);
        assert_eq!(store.get(&alice()).value(), 45.0);
        assert_eq!(store.get(&bob).value(), 52.5);
        assert_eq!(store.record(&bob).unwrap().correct_votes, 1);
    }

    #[test]
    fn custom_params_change_the_rules() {
        let params = ProtocolParams {
            reputation_initial: 20.0,
            reputation_gain_factor: 0.5,
            ..Default::default()
        };
        let store = ReputationStore::with_params(&params);
        assert_eq!(store.get(&alice()).value(), 20.0);
        assert_eq!(store.apply_outcome(&alice(), true).value(), 60.0);
    }

    #[test]
    fn expert_status_follows_threshold() {
        let store = ReputationStore::new();
        store.insert(alice(), Reputation::new(91.0));
        assert!(store.is_expert(&alice()));
        assert!(!store.is_expert(&ParticipantId::new("bob")));
    }

    #[test]
    fn expert_threshold_comes_from_params() {
        let params = ProtocolParams {
            expert_reputation: 70.0,
            ..Default::default()
        };
        let store = ReputationStore::with_params(&params);
        store.insert(alice(), Reputation::new(75.0));
        assert!(store.is_expert(&alice()));
        assert!(!ReputationStore::new().is_expert(&alice()));
    }
}
