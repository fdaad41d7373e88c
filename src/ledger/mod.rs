use std::{
    collections::{BTreeMap, HashMap, hash_map::Entry},
    io::{self, Write},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    account::{Account, AccountError, AccountId, SavingsAccount},
    history::{HistoryEntry, HistoryError, TransactionHistory, TransactionId},
    transfer::{Transfer, TransferError},
};

pub mod report;

pub use report::{LedgerSnapshot, Report};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Account `{id}` does not exist")]
    AccountNotFound { id: AccountId },
    #[error("Account `{id}` is closed")]
    AccountClosed { id: AccountId },
    #[error("Account `{id}` already exists")]
    DuplicateAccount { id: AccountId },
    #[error("Account `{id}` does not bear interest")]
    InterestNotSupported { id: AccountId },
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl LedgerError {
    /// True when funds were lost and the ledger needs operator intervention.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::Transfer(err) if err.is_fatal())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Closed,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<AccountId, Arc<dyn Account>>,
    // has an entry for every key of `accounts`
    status: HashMap<AccountId, AccountStatus>,
    history: TransactionHistory,
    last_tx_id: TransactionId,
}

impl LedgerState {
    fn is_active(&self, id: &str) -> bool {
        self.status.get(id) == Some(&AccountStatus::Active)
    }

    fn active_account(&self, id: &str) -> Option<&Arc<dyn Account>> {
        self.accounts.get(id).filter(|_| self.is_active(id))
    }

    /// Resolves an account for a single-account operation.
    fn open_account(&self, id: &str) -> Result<&Arc<dyn Account>, LedgerError> {
        let account = self
            .accounts
            .get(id)
            .ok_or_else(|| LedgerError::AccountNotFound { id: id.to_owned() })?;
        if !self.is_active(id) {
            return Err(LedgerError::AccountClosed { id: id.to_owned() });
        }
        Ok(account)
    }

    fn next_tx_id(&mut self) -> TransactionId {
        self.last_tx_id += 1;
        self.last_tx_id
    }

    fn transfer(
        &self,
        tx_id: TransactionId,
        from_id: &str,
        to_id: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let from = self
            .active_account(from_id)
            .ok_or_else(|| LedgerError::AccountNotFound {
                id: from_id.to_owned(),
            })?;
        let to = self
            .active_account(to_id)
            .ok_or_else(|| LedgerError::AccountNotFound {
                id: to_id.to_owned(),
            })?;
        let mut transfer = Transfer::new(tx_id, Some(&**from), Some(&**to), amount);
        transfer.execute()?;
        Ok(())
    }

    fn balances(&self) -> Report {
        self.accounts
            .iter()
            .filter(|(id, _)| self.is_active(id))
            .map(|(id, acc)| (id.clone(), acc.balance()))
            .collect()
    }

    fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        Ok(LedgerSnapshot::new(self.balances())?)
    }
}

/// Registry owning every account, its active/closed status and the
/// transfer history.
///
/// All state sits behind one lock. Operations that mutate balances or status
/// (including deposits and withdrawals routed through the ledger) take it
/// exclusively, so transfers are serialized against everything else. Reads
/// share it and always see a consistent view.
#[derive(Debug, Default)]
pub struct Ledger {
    state: RwLock<LedgerState>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // Nothing panics between validating and applying a change, so the state
    // behind a poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an account as active. Ids are unique for the lifetime of the
    /// ledger, closed accounts included.
    pub fn create_account(&self, account: Arc<dyn Account>) -> Result<(), LedgerError> {
        let mut state = self.write();
        let id = account.id().to_owned();
        match state.accounts.entry(id.clone()) {
            Entry::Occupied(_) => return Err(LedgerError::DuplicateAccount { id }),
            Entry::Vacant(entry) => {
                entry.insert(account);
            }
        }
        state.status.insert(id.clone(), AccountStatus::Active);
        info!(account = %id, "account created");
        Ok(())
    }

    pub fn open_savings_account(
        &self,
        id: impl Into<AccountId>,
        balance: Decimal,
        interest_rate: Decimal,
    ) -> Result<Arc<SavingsAccount>, LedgerError> {
        let account = Arc::new(SavingsAccount::new(id, balance, interest_rate)?);
        self.create_account(account.clone())?;
        Ok(account)
    }

    /// Marks an account as closed. Closing is one-way; closing again is a
    /// no-op.
    pub fn close_account(&self, id: &str) -> Result<(), LedgerError> {
        let mut state = self.write();
        let Some(status) = state.status.get_mut(id) else {
            return Err(LedgerError::AccountNotFound { id: id.to_owned() });
        };
        *status = AccountStatus::Closed;
        info!(account = id, "account closed");
        Ok(())
    }

    /// Looks up an account regardless of its status.
    pub fn get_account(&self, id: &str) -> Result<Arc<dyn Account>, LedgerError> {
        self.read()
            .accounts
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound { id: id.to_owned() })
    }

    /// `false` both for closed accounts and for ids that were never created.
    pub fn is_account_active(&self, id: &str) -> bool {
        self.read().is_active(id)
    }

    pub fn account_status(&self, id: &str) -> Option<AccountStatus> {
        self.read().status.get(id).copied()
    }

    pub fn deposit(&self, id: &str, amount: Decimal) -> Result<(), LedgerError> {
        let state = self.write();
        state.open_account(id)?.deposit(amount)?;
        Ok(())
    }

    pub fn withdraw(&self, id: &str, amount: Decimal) -> Result<(), LedgerError> {
        let state = self.write();
        state.open_account(id)?.withdraw(amount)?;
        Ok(())
    }

    pub fn balance(&self, id: &str) -> Result<Decimal, LedgerError> {
        Ok(self.read().open_account(id)?.balance())
    }

    /// Moves `amount` from one active account to another.
    ///
    /// Every attempt gets a fresh transaction id and a history entry, failed
    /// ones included. Returns the id of the successful transaction.
    pub fn transfer_funds(
        &self,
        from_id: &str,
        to_id: &str,
        amount: Decimal,
    ) -> Result<TransactionId, LedgerError> {
        let mut state = self.write();
        let tx_id = state.next_tx_id();

        let result = state.transfer(tx_id, from_id, to_id, amount);
        let entry = match &result {
            Ok(()) => {
                debug!(tx_id, from = from_id, to = to_id, %amount, "transfer succeeded");
                HistoryEntry::success(tx_id, from_id, to_id, amount)
            }
            Err(err) => {
                warn!(tx_id, from = from_id, to = to_id, %amount, %err, "transfer failed");
                HistoryEntry::failure(tx_id, from_id, to_id, amount, err.to_string())
            }
        };
        state.history.record(entry)?;

        result.map(|()| tx_id)
    }

    /// Applies interest to one active, interest-bearing account and returns
    /// the accrued amount.
    pub fn apply_interest(&self, id: &str) -> Result<Decimal, LedgerError> {
        let state = self.write();
        let account = state.open_account(id)?;
        let bearing = account
            .interest_bearing()
            .ok_or_else(|| LedgerError::InterestNotSupported { id: id.to_owned() })?;
        Ok(bearing.apply_interest()?)
    }

    /// Applies interest to every active interest-bearing account.
    ///
    /// Meant for a periodic external scheduler. Accounts that fail are logged
    /// and left out of the result.
    pub fn accrue_interest(&self) -> BTreeMap<AccountId, Decimal> {
        let state = self.write();
        let mut accrued = BTreeMap::new();
        for (id, account) in &state.accounts {
            if !state.is_active(id) {
                continue;
            }
            let Some(bearing) = account.interest_bearing() else {
                continue;
            };
            match bearing.apply_interest() {
                Ok(amount) => {
                    accrued.insert(id.clone(), amount);
                }
                Err(err) => warn!(account = %id, %err, "interest accrual failed"),
            }
        }
        accrued
    }

    /// Balances of active accounts.
    pub fn report(&self) -> Report {
        self.read().balances()
    }

    /// Sum of the balances of active accounts.
    pub fn total_balance(&self) -> Result<Decimal, LedgerError> {
        Ok(self.read().snapshot()?.total())
    }

    /// Report and total from a single read, guaranteed to agree.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        self.read().snapshot()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.read().history.iter().cloned().collect()
    }

    pub fn history_entry(&self, id: TransactionId) -> Option<HistoryEntry> {
        self.read().history.get(id).cloned()
    }

    pub fn display_transaction_history<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let state = self.read();
        writeln!(output, "Transaction History:")?;
        for entry in state.history.iter() {
            writeln!(output, "{entry}")?;
        }
        writeln!(output, "END")
    }
}
