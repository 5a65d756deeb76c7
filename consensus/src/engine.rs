//! The consensus engine: claim registry, staking front door and resolution.

use crate::claim::{Claim, ClaimDraft, ClaimStatus};
use crate::config::EngineConfig;
use crate::error::ConsensusError;
use crate::resolution::{compute_resolution, ResolutionRecord};
use crate::stats::{EngineStats, StatsSnapshot};
use crate::summary::ParticipantSummary;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use verity_ledger::StakeLedger;
use verity_reputation::ReputationStore;
use verity_types::{ClaimId, ParticipantId, ProtocolParams, Side, StakeId, Timestamp, VrtAmount};

type ClaimCell = Arc<RwLock<Claim>>;

/// Resolves claims and distributes rewards.
///
/// Concurrency model:
/// - each claim sits behind its own `RwLock`; stakes hold the read side while
///   they check the claim is open and record, resolution takes the write side
///   only to flip `Open → Resolving`, so a stake either lands before the flip
///   or is refused with `ClaimNotOpen`;
/// - balance updates serialize per participant inside the [`StakeLedger`];
/// - the compute-and-apply phase of resolutions runs under one settlement
///   lock, so the reputations a resolution reads are the ones it replaces.
pub struct ConsensusEngine {
    params: ProtocolParams,
    ledger: Arc<StakeLedger>,
    reputation: Arc<ReputationStore>,
    claims: RwLock<BTreeMap<ClaimId, ClaimCell>>,
    resolutions: RwLock<HashMap<ClaimId, ResolutionRecord>>,
    next_claim_id: AtomicU64,
    settlement: Mutex<()>,
    stats: EngineStats,
}

impl ConsensusEngine {
    /// Engine with the default protocol parameters and empty stores.
    pub fn new() -> Self {
        let params = ProtocolParams::default();
        let reputation = Arc::new(ReputationStore::with_params(&params));
        Self::assemble(params, Arc::new(StakeLedger::new()), reputation)
    }

    /// Engine with custom parameters and empty stores.
    pub fn with_params(params: ProtocolParams) -> Result<Self, ConsensusError> {
        params.validate()?;
        let reputation = Arc::new(ReputationStore::with_params(&params));
        Ok(Self::assemble(params, Arc::new(StakeLedger::new()), reputation))
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ConsensusError> {
        Self::with_params(config.params.clone())
    }

    /// Engine over existing stores, e.g. shared with other services.
    pub fn with_stores(
        params: ProtocolParams,
        ledger: Arc<StakeLedger>,
        reputation: Arc<ReputationStore>,
    ) -> Result<Self, ConsensusError> {
        params.validate()?;
        Ok(Self::assemble(params, ledger, reputation))
    }

    fn assemble(
        params: ProtocolParams,
        ledger: Arc<StakeLedger>,
        reputation: Arc<ReputationStore>,
    ) -> Self {
        Self {
            params,
            ledger,
            reputation,
            claims: RwLock::new(BTreeMap::new()),
            resolutions: RwLock::new(HashMap::new()),
            next_claim_id: AtomicU64::new(1),
            settlement: Mutex::new(()),
            stats: EngineStats::default(),
        }
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    pub fn ledger(&self) -> &StakeLedger {
        &self.ledger
    }

    pub fn reputation(&self) -> &ReputationStore {
        &self.reputation
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    // ── Participants ─────────────────────────────────────────────────────

    /// Register a participant with an opening balance and the initial reputation.
    pub fn open_account(
        &self,
        participant: ParticipantId,
        initial_balance: VrtAmount,
    ) -> Result<(), ConsensusError> {
        self.ledger.open_account(participant.clone(), initial_balance)?;
        self.reputation.ensure(&participant);
        Ok(())
    }

    pub fn deposit(
        &self,
        participant: &ParticipantId,
        amount: VrtAmount,
    ) -> Result<VrtAmount, ConsensusError> {
        if !self.ledger.has_account(participant) {
            return Err(ConsensusError::UnknownParticipant(participant.to_string()));
        }
        Ok(self.ledger.credit(participant, amount))
    }

    pub fn participant_summary(
        &self,
        participant: &ParticipantId,
    ) -> Result<ParticipantSummary, ConsensusError> {
        let account = self
            .ledger
            .account(participant)
            .ok_or_else(|| ConsensusError::UnknownParticipant(participant.to_string()))?;
        let record = self.reputation.record(participant);
        let active_claims = self
            .ledger
            .claims_staked_by(participant)
            .into_iter()
            .filter(|id| self.claim(*id).map(|c| c.is_open()).unwrap_or(false))
            .count();

        Ok(ParticipantSummary {
            participant: participant.clone(),
            balance: account.balance,
            reputation: self.reputation.get(participant),
            is_expert: self.reputation.is_expert(participant),
            correct_votes: record.map(|r| r.correct_votes).unwrap_or(0),
            total_votes: record.map(|r| r.total_votes()).unwrap_or(0),
            total_staked: account.total_staked,
            total_earned: account.total_earned,
            active_claims,
        })
    }

    // ── Claims ───────────────────────────────────────────────────────────

    /// Submit a claim, charging the author the posting fee.
    ///
    /// Nothing is created if the draft is invalid or the author cannot pay.
    pub fn submit_claim(
        &self,
        author: &ParticipantId,
        draft: ClaimDraft,
        now: Timestamp,
    ) -> Result<ClaimId, ConsensusError> {
        draft.validate()?;
        if !self.ledger.has_account(author) {
            return Err(ConsensusError::UnknownParticipant(author.to_string()));
        }
        if let Err(e) = self.ledger.debit(author, self.params.post_cost) {
            tracing::warn!(%author, error = %e, "claim submission rejected");
            return Err(e.into());
        }
        self.ledger.credit_reserve(self.params.post_cost);
        self.reputation.ensure(author);

        let id = ClaimId::new(self.next_claim_id.fetch_add(1, Ordering::Relaxed));
        let claim = Claim::from_draft(
            id,
            author.clone(),
            draft,
            now,
            self.params.claim_voting_period_secs,
        );
        tracing::info!(claim = %id, %author, category = %claim.category, title = %claim.title, "claim submitted");
        self.claims_write().insert(id, Arc::new(RwLock::new(claim)));
        self.stats.claim_submitted();
        Ok(id)
    }

    pub fn claim(&self, id: ClaimId) -> Option<Claim> {
        self.claim_cell(id).map(|cell| read_claim(&cell).clone())
    }

    /// All claims in id order, optionally filtered by status.
    pub fn claims(&self, status: Option<ClaimStatus>) -> Vec<Claim> {
        let cells: Vec<ClaimCell> = self.claims_read().values().cloned().collect();
        cells
            .iter()
            .map(|cell| read_claim(cell).clone())
            .filter(|c| status.map_or(true, |s| c.status == s))
            .collect()
    }

    /// `(verify_total, dispute_total)` currently staked on a claim.
    pub fn claim_totals(&self, id: ClaimId) -> Result<(VrtAmount, VrtAmount), ConsensusError> {
        self.claim_cell(id).ok_or(ConsensusError::UnknownClaim(id))?;
        Ok((
            self.ledger.sum_by_side(id, Side::Verify),
            self.ledger.sum_by_side(id, Side::Dispute),
        ))
    }

    // ── Staking ──────────────────────────────────────────────────────────

    /// Stake `amount` on one side of an open claim.
    pub fn place_stake(
        &self,
        claim_id: ClaimId,
        participant: &ParticipantId,
        side: Side,
        amount: VrtAmount,
        now: Timestamp,
    ) -> Result<StakeId, ConsensusError> {
        let result = self.try_place_stake(claim_id, participant, side, amount, now);
        match &result {
            Ok(_) => self.stats.stake_recorded(amount),
            Err(e) => {
                self.stats.stake_rejected();
                tracing::warn!(claim = %claim_id, %participant, %side, %amount, error = %e, "stake rejected");
            }
        }
        result
    }

    fn try_place_stake(
        &self,
        claim_id: ClaimId,
        participant: &ParticipantId,
        side: Side,
        amount: VrtAmount,
        now: Timestamp,
    ) -> Result<StakeId, ConsensusError> {
        let cell = self
            .claim_cell(claim_id)
            .ok_or(ConsensusError::UnknownClaim(claim_id))?;
        // Held until the stake is recorded so resolution cannot start mid-way.
        let claim = read_claim(&cell);
        if claim.status != ClaimStatus::Open {
            return Err(ConsensusError::ClaimNotOpen(claim_id));
        }
        let stake_id = self
            .ledger
            .record_stake(claim_id, participant, side, amount, now)?;
        drop(claim);
        self.reputation.ensure(participant);
        Ok(stake_id)
    }

    /// One-click vote: stake exactly the minimum vote stake.
    pub fn cast_vote(
        &self,
        claim_id: ClaimId,
        participant: &ParticipantId,
        side: Side,
        now: Timestamp,
    ) -> Result<StakeId, ConsensusError> {
        self.place_stake(claim_id, participant, side, self.params.min_vote_stake, now)
    }

    // ── Resolution ───────────────────────────────────────────────────────

    /// Resolve an open claim.
    ///
    /// Fails with `AlreadyResolved` once the claim is resolved, with
    /// `ClaimNotOpen` while another resolution is still running, and with
    /// `NoStakes` (leaving the claim open) if nobody staked.
    pub fn resolve(&self, claim_id: ClaimId, now: Timestamp) -> Result<ResolutionRecord, ConsensusError> {
        let cell = self
            .claim_cell(claim_id)
            .ok_or(ConsensusError::UnknownClaim(claim_id))?;
        {
            let mut claim = write_claim(&cell);
            match claim.status {
                ClaimStatus::Open => claim.status = ClaimStatus::Resolving,
                // The in-flight resolution may still fail and reopen the claim.
                ClaimStatus::Resolving => {
                    tracing::warn!(claim = %claim_id, "resolution already in progress");
                    return Err(ConsensusError::ClaimNotOpen(claim_id));
                }
                ClaimStatus::Resolved => {
                    tracing::warn!(claim = %claim_id, "duplicate resolution refused");
                    return Err(ConsensusError::AlreadyResolved(claim_id));
                }
            }
        }

        match self.settle(claim_id, now) {
            Ok(record) => {
                write_claim(&cell).status = ClaimStatus::Resolved;
                self.stats.claim_resolved();
                Ok(record)
            }
            Err(e) => {
                write_claim(&cell).status = ClaimStatus::Open;
                tracing::warn!(claim = %claim_id, error = %e, "resolution aborted");
                Err(e)
            }
        }
    }

    /// Compute the full record, then apply payouts and reputation as a unit.
    fn settle(&self, claim_id: ClaimId, now: Timestamp) -> Result<ResolutionRecord, ConsensusError> {
        let _settlement = self
            .settlement
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let stakes = self.ledger.stakes_for_claim(claim_id);
        let reputations = self
            .reputation
            .snapshot(stakes.iter().map(|s| &s.participant));
        let record = compute_resolution(claim_id, stakes.as_slice(), &reputations, &self.params, now)?;

        self.ledger.settle(&record.payouts, record.retained);
        self.reputation.commit(&record.reputation_changes);
        for change in &record.reputation_changes {
            tracing::debug!(
                claim = %claim_id,
                participant = %change.participant,
                before = %change.before,
                after = %change.after,
                correct = change.correct,
                "reputation moved"
            );
        }
        self.resolutions_write().insert(claim_id, record.clone());

        tracing::info!(
            claim = %claim_id,
            outcome = if record.outcome { "verified" } else { "disputed" },
            pool = %record.reward_pool,
            winners = record.payouts.len(),
            retained = %record.retained,
            "claim resolved"
        );
        Ok(record)
    }

    /// Resolve every open claim whose voting deadline has passed, in id order.
    pub fn resolve_expired(
        &self,
        now: Timestamp,
    ) -> Vec<(ClaimId, Result<ResolutionRecord, ConsensusError>)> {
        let due: Vec<ClaimId> = self
            .claims(Some(ClaimStatus::Open))
            .into_iter()
            .filter(|c| c.is_due(now))
            .map(|c| c.id)
            .collect();
        due.into_iter()
            .map(|id| (id, self.resolve(id, now)))
            .collect()
    }

    pub fn resolution(&self, claim_id: ClaimId) -> Option<ResolutionRecord> {
        self.resolutions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&claim_id)
            .cloned()
    }

    // ── Lock helpers ─────────────────────────────────────────────────────

    fn claim_cell(&self, id: ClaimId) -> Option<ClaimCell> {
        self.claims_read().get(&id).cloned()
    }

    fn claims_read(&self) -> RwLockReadGuard<'_, BTreeMap<ClaimId, ClaimCell>> {
        self.claims.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn claims_write(&self) -> RwLockWriteGuard<'_, BTreeMap<ClaimId, ClaimCell>> {
        self.claims.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolutions_write(&self) -> RwLockWriteGuard<'_, HashMap<ClaimId, ResolutionRecord>> {
        self.resolutions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ConsensusEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn read_claim(cell: &ClaimCell) -> RwLockReadGuard<'_, Claim> {
    cell.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_claim(cell: &ClaimCell) -> RwLockWriteGuard<'_, Claim> {
    cell.write().unwrap_or_else(PoisonError::into_inner)
}
