use rust_decimal::Decimal;

use super::{Account, AccountError, SavingsAccount};

/// Account whose deposits always fail, standing in for a destination-side
/// invariant violation.
#[derive(Debug)]
pub struct DepositRejectingAccount {
    inner: SavingsAccount,
}

impl DepositRejectingAccount {
    pub fn new(id: &str, balance: Decimal) -> Self {
        Self {
            inner: SavingsAccount::new(id, balance, Decimal::ZERO).unwrap(),
        }
    }
}

impl Account for DepositRejectingAccount {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn balance(&self) -> Decimal {
        self.inner.balance()
    }

    fn deposit(&self, _amount: Decimal) -> Result<(), AccountError> {
        Err(AccountError::BalanceOverflow)
    }

    fn withdraw(&self, amount: Decimal) -> Result<(), AccountError> {
        self.inner.withdraw(amount)
    }
}
