use std::fmt::Debug;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

mod savings;
#[cfg(test)]
pub(crate) mod testing;

pub use savings::SavingsAccount;

pub type AccountId = String;

/// Number of decimal places accrued interest is rounded to.
pub const MONEY_SCALE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEventKind {
    Deposited,
    Withdrawn,
    InterestAccrued,
}

#[derive(Debug, Clone, Copy)]
pub struct AccountEvent {
    amount: Decimal,
    kind: AccountEventKind,
}

impl AccountEvent {
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> AccountEventKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Amount must not be negative, got {amount}")]
    InvalidAmount { amount: Decimal },
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
    #[error("Interest rate must not be negative, got {rate}")]
    InvalidInterestRate { rate: Decimal },
    #[error("Account id must not be empty")]
    EmptyId,
    #[error("Balance would overflow")]
    BalanceOverflow,
}

/// Balance-holding entity owned by the ledger.
///
/// Implementations guard their own state, so every method takes `&self` and
/// each mutation is a single atomic step: concurrent callers never observe a
/// balance between a withdrawal's check and its subtraction.
pub trait Account: Debug + Send + Sync {
    fn id(&self) -> &str;

    fn balance(&self) -> Decimal;

    fn deposit(&self, amount: Decimal) -> Result<(), AccountError>;

    fn withdraw(&self, amount: Decimal) -> Result<(), AccountError>;

    /// Interest capability, if the account variant has one.
    fn interest_bearing(&self) -> Option<&dyn InterestBearing> {
        None
    }
}

pub trait InterestBearing {
    fn interest_rate(&self) -> Decimal;

    /// Sets balance to `balance * (1 + rate)` and returns the accrued amount.
    fn apply_interest(&self) -> Result<Decimal, AccountError>;
}

/// Funds held by an account.
///
/// Mutations are split into a validating `handle_*` step that produces an
/// [`AccountEvent`] and an infallible [`Funds::apply`]. Callers hold the
/// account lock across both.
#[derive(Debug, Default)]
pub struct Funds {
    balance: Decimal,
}

impl Funds {
    pub fn new(balance: Decimal) -> Result<Self, AccountError> {
        if balance < Decimal::ZERO {
            return Err(AccountError::InvalidAmount { amount: balance });
        }
        Ok(Self { balance })
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn handle_deposit(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        if amount < Decimal::ZERO {
            return Err(AccountError::InvalidAmount { amount });
        }
        if self.balance.checked_add(amount).is_none() {
            return Err(AccountError::BalanceOverflow);
        }
        Ok(AccountEvent {
            amount,
            kind: AccountEventKind::Deposited,
        })
    }

    pub fn handle_withdraw(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        if amount < Decimal::ZERO {
            return Err(AccountError::InvalidAmount { amount });
        }
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        Ok(AccountEvent {
            amount,
            kind: AccountEventKind::Withdrawn,
        })
    }

    pub fn handle_interest(&self, rate: Decimal) -> Result<AccountEvent, AccountError> {
        // only the accrued part is rounded, the existing balance is kept as is
        let accrued = self
            .balance
            .checked_mul(rate)
            .ok_or(AccountError::BalanceOverflow)?
            .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
            .max(Decimal::ZERO);
        if self.balance.checked_add(accrued).is_none() {
            return Err(AccountError::BalanceOverflow);
        }
        Ok(AccountEvent {
            amount: accrued,
            kind: AccountEventKind::InterestAccrued,
        })
    }

    pub fn apply(&mut self, event: &AccountEvent) {
        match event.kind {
            AccountEventKind::Deposited | AccountEventKind::InterestAccrued => {
                self.balance += event.amount;
            }
            AccountEventKind::Withdrawn => {
                self.balance -= event.amount;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn apply_events() {
        let mut funds = Funds::default();
        funds.apply(&AccountEvent {
            amount: dec!(10),
            kind: AccountEventKind::Deposited,
        });
        assert_eq!(funds.balance(), dec!(10));
        funds.apply(&AccountEvent {
            amount: dec!(3),
            kind: AccountEventKind::Withdrawn,
        });
        assert_eq!(funds.balance(), dec!(7));
        // event is the source of truth, there's no more validation happening
        funds.apply(&AccountEvent {
            amount: dec!(0.35),
            kind: AccountEventKind::InterestAccrued,
        });
        assert_eq!(funds.balance(), dec!(7.35));
    }

    #[test]
    fn opening_balance_must_not_be_negative() {
        assert!(Funds::new(dec!(0)).is_ok());
        let err = Funds::new(dec!(-1)).unwrap_err();
        assert_eq!(err, AccountError::InvalidAmount { amount: dec!(-1) });
    }

    #[test]
    fn handle_deposit() {
        let funds = Funds::new(dec!(5)).unwrap();
        let evt = funds.handle_deposit(dec!(2.5)).unwrap();
        assert_eq!(evt.kind(), AccountEventKind::Deposited);
        assert_eq!(evt.amount(), dec!(2.5));

        // zero is a valid, if pointless, deposit
        assert!(funds.handle_deposit(Decimal::ZERO).is_ok());

        let err = funds.handle_deposit(dec!(-0.01)).unwrap_err();
        assert_eq!(err, AccountError::InvalidAmount { amount: dec!(-0.01) });

        let full = Funds::new(Decimal::MAX).unwrap();
        let err = full.handle_deposit(dec!(1)).unwrap_err();
        assert_eq!(err, AccountError::BalanceOverflow);
    }

    #[test]
    fn handle_withdraw() {
        let mut funds = Funds::new(dec!(5)).unwrap();

        let err = funds.handle_withdraw(dec!(-1)).unwrap_err();
        assert_eq!(err, AccountError::InvalidAmount { amount: dec!(-1) });

        let err = funds.handle_withdraw(dec!(5.01)).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                requested: dec!(5.01),
                available: dec!(5),
            }
        );
        assert_eq!(
            err.to_string(),
            "Insufficient funds: requested 5.01, available 5"
        );

        // draining the account completely is fine
        let evt = funds.handle_withdraw(dec!(5)).unwrap();
        assert_eq!(evt.kind(), AccountEventKind::Withdrawn);
        funds.apply(&evt);
        assert_eq!(funds.balance(), Decimal::ZERO);
    }

    #[test]
    fn handle_interest() {
        let mut funds = Funds::new(dec!(100)).unwrap();
        let evt = funds.handle_interest(dec!(0.05)).unwrap();
        assert_eq!(evt.kind(), AccountEventKind::InterestAccrued);
        assert_eq!(evt.amount(), dec!(5));
        funds.apply(&evt);
        assert_eq!(funds.balance(), dec!(105));

        // accrued part is rounded to MONEY_SCALE places, ties to even
        let funds = Funds::new(dec!(0.0125)).unwrap();
        let evt = funds.handle_interest(dec!(0.1)).unwrap();
        assert_eq!(evt.amount(), dec!(0.0012));
        let funds = Funds::new(dec!(0.0135)).unwrap();
        let evt = funds.handle_interest(dec!(0.1)).unwrap();
        assert_eq!(evt.amount(), dec!(0.0014));

        let err = Funds::new(Decimal::MAX)
            .unwrap()
            .handle_interest(dec!(1))
            .unwrap_err();
        assert_eq!(err, AccountError::BalanceOverflow);
    }

    #[test]
    fn interest_keeps_sub_scale_funds() {
        // nothing accrues at a zero rate, fractional balance stays intact
        let mut funds = Funds::new(dec!(0.00005)).unwrap();
        let evt = funds.handle_interest(Decimal::ZERO).unwrap();
        assert_eq!(evt.amount(), Decimal::ZERO);
        funds.apply(&evt);
        assert_eq!(funds.balance(), dec!(0.00005));

        let mut funds = Funds::new(dec!(100)).unwrap();
        let evt = funds.handle_deposit(dec!(0.00004)).unwrap();
        funds.apply(&evt);
        let evt = funds.handle_interest(dec!(0.05)).unwrap();
        assert_eq!(evt.amount(), dec!(5));
        funds.apply(&evt);
        assert_eq!(funds.balance(), dec!(105.00004));
    }
}
