//! The stake ledger itself.

use crate::account::AccountInfo;
use crate::error::LedgerError;
use crate::stake::{ClaimStakes, Stake};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use verity_types::{ClaimId, ParticipantId, Side, StakeId, Timestamp, VrtAmount};

type AccountCell = Arc<Mutex<AccountInfo>>;

/// Balances, stakes and the protocol reserve.
///
/// Lock order: a participant's account lock may be held while taking the
/// stakes lock, never the other way round.
pub struct StakeLedger {
    /// Per-participant accounts, each behind its own mutex.
    accounts: RwLock<HashMap<ParticipantId, AccountCell>>,
    /// claim → stakes in insertion order, copy-on-write under snapshots.
    stakes: RwLock<HashMap<ClaimId, Arc<Vec<Stake>>>>,
    next_stake_id: AtomicU64,
    /// Tokens held by the protocol: post fees and forfeited stakes.
    reserve: Mutex<VrtAmount>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            stakes: RwLock::new(HashMap::new()),
            next_stake_id: AtomicU64::new(1),
            reserve: Mutex::new(VrtAmount::ZERO),
        }
    }

    /// Register a participant with an opening balance.
    pub fn open_account(
        &self,
        participant: ParticipantId,
        initial_balance: VrtAmount,
    ) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.contains_key(&participant) {
            return Err(LedgerError::AccountExists(participant.to_string()));
        }
        tracing::debug!(%participant, balance = %initial_balance, "account opened");
        accounts.insert(
            participant,
            Arc::new(Mutex::new(AccountInfo::with_balance(initial_balance))),
        );
        Ok(())
    }

    pub fn has_account(&self, participant: &ParticipantId) -> bool {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(participant)
    }

    pub fn account(&self, participant: &ParticipantId) -> Option<AccountInfo> {
        self.cell(participant).map(|cell| *lock(&cell))
    }

    pub fn balance(&self, participant: &ParticipantId) -> Result<VrtAmount, LedgerError> {
        self.account(participant)
            .map(|a| a.balance)
            .ok_or_else(|| LedgerError::UnknownParticipant(participant.to_string()))
    }

    /// Subtract from a balance. Fails without touching the balance if the
    /// amount exceeds it. Returns the new balance.
    pub fn debit(
        &self,
        participant: &ParticipantId,
        amount: VrtAmount,
    ) -> Result<VrtAmount, LedgerError> {
        let cell = self.existing_cell(participant)?;
        let mut account = lock(&cell);
        withdraw(&mut account, amount)?;
        Ok(account.balance)
    }

    /// Add to a balance, opening an empty account first if needed. Never fails.
    pub fn credit(&self, participant: &ParticipantId, amount: VrtAmount) -> VrtAmount {
        let cell = self.cell_or_open(participant);
        let mut account = lock(&cell);
        account.balance = account.balance.saturating_add(amount);
        account.balance
    }

    /// Credit a reward: like [`credit`](Self::credit), and counted as earnings.
    pub fn credit_reward(&self, participant: &ParticipantId, amount: VrtAmount) -> VrtAmount {
        let cell = self.cell_or_open(participant);
        let mut account = lock(&cell);
        account.balance = account.balance.saturating_add(amount);
        account.total_earned = account.total_earned.saturating_add(amount);
        account.balance
    }

    /// Debit a participant and append a stake, as one all-or-nothing step.
    pub fn record_stake(
        &self,
        claim_id: ClaimId,
        participant: &ParticipantId,
        side: Side,
        amount: VrtAmount,
        now: Timestamp,
    ) -> Result<StakeId, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let cell = self.existing_cell(participant)?;
        let mut account = lock(&cell);
        withdraw(&mut account, amount)?;
        account.total_staked = account.total_staked.saturating_add(amount);

        let id = StakeId::new(self.next_stake_id.fetch_add(1, Ordering::Relaxed));
        let mut stakes = self.stakes.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(stakes.entry(claim_id).or_default()).push(Stake {
            id,
            claim_id,
            participant: participant.clone(),
            side,
            amount,
            placed_at: now,
        });
        drop(stakes);

        tracing::debug!(%claim_id, %participant, %side, %amount, stake = %id, "stake recorded");
        Ok(id)
    }

    /// Total staked on one side of a claim; zero when there are none.
    pub fn sum_by_side(&self, claim_id: ClaimId, side: Side) -> VrtAmount {
        self.stakes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&claim_id)
            .map(|stakes| {
                stakes
                    .iter()
                    .filter(|s| s.side == side)
                    .map(|s| s.amount)
                    .sum()
            })
            .unwrap_or(VrtAmount::ZERO)
    }

    /// Snapshot of a claim's stakes in insertion order. Does not copy the list.
    pub fn stakes_for_claim(&self, claim_id: ClaimId) -> ClaimStakes {
        self.stakes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&claim_id)
            .map(|stakes| ClaimStakes::new(Arc::clone(stakes)))
            .unwrap_or_default()
    }

    /// Claims on which a participant holds at least one stake, ascending.
    pub fn claims_staked_by(&self, participant: &ParticipantId) -> Vec<ClaimId> {
        let stakes = self.stakes.read().unwrap_or_else(PoisonError::into_inner);
        let mut claims: Vec<ClaimId> = stakes
            .iter()
            .filter(|(_, list)| list.iter().any(|s| &s.participant == participant))
            .map(|(claim, _)| *claim)
            .collect();
        claims.sort();
        claims
    }

    /// Move tokens into the protocol reserve.
    pub fn credit_reserve(&self, amount: VrtAmount) {
        let mut reserve = self.reserve.lock().unwrap_or_else(PoisonError::into_inner);
        *reserve = reserve.saturating_add(amount);
    }

    pub fn reserve(&self) -> VrtAmount {
        *self.reserve.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a claim settlement: reward every winner and move what is left to
    /// the reserve. Credits cannot fail, so the settlement is never partial.
    pub fn settle(&self, payouts: &BTreeMap<ParticipantId, VrtAmount>, retained: VrtAmount) {
        for (participant, amount) in payouts {
            self.credit_reward(participant, *amount);
        }
        self.credit_reserve(retained);
    }

    /// Sum of every participant balance plus the reserve.
    pub fn total_holdings(&self) -> VrtAmount {
        let cells: Vec<AccountCell> = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        let balances: VrtAmount = cells.iter().map(|c| lock(c).balance).sum();
        balances.saturating_add(self.reserve())
    }

    fn cell(&self, participant: &ParticipantId) -> Option<AccountCell> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(participant)
            .cloned()
    }

    fn existing_cell(&self, participant: &ParticipantId) -> Result<AccountCell, LedgerError> {
        self.cell(participant)
            .ok_or_else(|| LedgerError::UnknownParticipant(participant.to_string()))
    }

    fn cell_or_open(&self, participant: &ParticipantId) -> AccountCell {
        if let Some(cell) = self.cell(participant) {
            return cell;
        }
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(participant.clone())
            .or_insert_with(|| Arc::new(Mutex::new(AccountInfo::default())))
            .clone()
    }
}

impl Default for StakeLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(cell: &AccountCell) -> MutexGuard<'_, AccountInfo> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}

fn withdraw(account: &mut AccountInfo, amount: VrtAmount) -> Result<(), LedgerError> {
    account.balance = account
        .balance
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientBalance {
            needed: amount,
            available: account.balance,
        })?;
    Ok(())
}
