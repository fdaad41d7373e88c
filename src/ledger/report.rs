use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::account::{AccountError, AccountId};

/// Balances of active accounts, ordered by account id.
pub type Report = BTreeMap<AccountId, Decimal>;

/// Report and total taken from the same read of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerSnapshot {
    balances: Report,
    total: Decimal,
}

impl LedgerSnapshot {
    /// Fails with [`AccountError::BalanceOverflow`] when the total does not fit.
    pub fn new(balances: Report) -> Result<Self, AccountError> {
        let total = balances
            .values()
            .try_fold(Decimal::ZERO, |total, balance| total.checked_add(*balance))
            .ok_or(AccountError::BalanceOverflow)?;
        Ok(Self { balances, total })
    }

    pub fn balances(&self) -> &Report {
        &self.balances
    }

    pub fn total(&self) -> Decimal {
        self.total
    }
}
