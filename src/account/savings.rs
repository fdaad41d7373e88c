use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::debug;

use super::{Account, AccountError, AccountId, Funds, InterestBearing};

/// Interest-bearing account, guarded by its own lock so that direct calls
/// made outside of the ledger stay atomic.
#[derive(Debug)]
pub struct SavingsAccount {
    id: AccountId,
    interest_rate: Decimal,
    funds: Mutex<Funds>,
}

impl SavingsAccount {
    pub fn new(
        id: impl Into<AccountId>,
        balance: Decimal,
        interest_rate: Decimal,
    ) -> Result<Self, AccountError> {
        let id = id.into();
        if id.is_empty() {
            return Err(AccountError::EmptyId);
        }
        if interest_rate < Decimal::ZERO {
            return Err(AccountError::InvalidInterestRate {
                rate: interest_rate,
            });
        }
        Ok(Self {
            id,
            interest_rate,
            funds: Mutex::new(Funds::new(balance)?),
        })
    }

    // `Funds` is only touched through validate-then-apply, so a poisoned lock
    // still guards a consistent balance.
    fn funds(&self) -> MutexGuard<'_, Funds> {
        self.funds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Account for SavingsAccount {
    fn id(&self) -> &str {
        &self.id
    }

    fn balance(&self) -> Decimal {
        self.funds().balance()
    }

    fn deposit(&self, amount: Decimal) -> Result<(), AccountError> {
        let mut funds = self.funds();
        let evt = funds.handle_deposit(amount)?;
        funds.apply(&evt);
        debug!(account = %self.id, %amount, balance = %funds.balance(), "deposited");
        Ok(())
    }

    fn withdraw(&self, amount: Decimal) -> Result<(), AccountError> {
        let mut funds = self.funds();
        let evt = funds.handle_withdraw(amount)?;
        funds.apply(&evt);
        debug!(account = %self.id, %amount, balance = %funds.balance(), "withdrawn");
        Ok(())
    }

    fn interest_bearing(&self) -> Option<&dyn InterestBearing> {
        Some(self)
    }
}

impl InterestBearing for SavingsAccount {
    fn interest_rate(&self) -> Decimal {
        self.interest_rate
    }

    fn apply_interest(&self) -> Result<Decimal, AccountError> {
        let mut funds = self.funds();
        let evt = funds.handle_interest(self.interest_rate)?;
        funds.apply(&evt);
        debug!(account = %self.id, accrued = %evt.amount(), balance = %funds.balance(), "interest applied");
        Ok(evt.amount())
    }
}
