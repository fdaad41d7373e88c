use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, warn};

use crate::{
    account::{Account, AccountError},
    history::{TransactionId, TransferStatus},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Transfer requires both a source and a destination account")]
    InvalidParticipants,
    #[error("Transfer amount must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },
    #[error(transparent)]
    Withdraw(AccountError),
    #[error(transparent)]
    Deposit(AccountError),
    /// Source was debited, the destination refused the funds and the source
    /// refused them back. The amount is gone from the ledger.
    #[error(
        "Irrecoverable transfer failure: deposit failed ({deposit}) and rollback failed ({rollback})"
    )]
    RollbackFailed {
        deposit: AccountError,
        rollback: AccountError,
    },
}

impl TransferError {
    /// True when the ledger lost funds and needs operator intervention.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransferError::RollbackFailed { .. })
    }
}

/// One attempt at moving funds between two accounts.
///
/// Lives only for the duration of a single transfer; its outcome is kept in
/// the transaction history, not here.
#[derive(Debug)]
pub struct Transfer<'a> {
    id: TransactionId,
    from: Option<&'a dyn Account>,
    to: Option<&'a dyn Account>,
    amount: Decimal,
    succeeded: bool,
}

impl<'a> Transfer<'a> {
    pub fn new(
        id: TransactionId,
        from: Option<&'a dyn Account>,
        to: Option<&'a dyn Account>,
        amount: Decimal,
    ) -> Self {
        Self {
            id,
            from,
            to,
            amount,
            succeeded: false,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn status(&self) -> TransferStatus {
        if self.succeeded {
            TransferStatus::Success
        } else {
            TransferStatus::Failed
        }
    }

    /// Withdraws from the source, then deposits into the destination.
    ///
    /// A failed deposit is compensated by re-depositing into the source. The
    /// source lock is released before the destination is touched, so two
    /// account locks are never held at once.
    pub fn execute(&mut self) -> Result<(), TransferError> {
        let (Some(from), Some(to)) = (self.from, self.to) else {
            return Err(TransferError::InvalidParticipants);
        };
        if self.amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount {
                amount: self.amount,
            });
        }

        from.withdraw(self.amount).map_err(TransferError::Withdraw)?;

        if let Err(deposit) = to.deposit(self.amount) {
            if let Err(rollback) = from.deposit(self.amount) {
                error!(
                    tx_id = self.id,
                    from = from.id(),
                    to = to.id(),
                    amount = %self.amount,
                    %deposit,
                    %rollback,
                    "Transfer rollback failed, funds lost from ledger"
                );
                return Err(TransferError::RollbackFailed { deposit, rollback });
            }
            warn!(
                tx_id = self.id,
                from = from.id(),
                to = to.id(),
                amount = %self.amount,
                %deposit,
                "Deposit failed, transfer rolled back"
            );
            return Err(TransferError::Deposit(deposit));
        }

        self.succeeded = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::account::{SavingsAccount, testing::DepositRejectingAccount};

    use super::*;

    fn savings(id: &str, balance: Decimal) -> SavingsAccount {
        SavingsAccount::new(id, balance, Decimal::ZERO).unwrap()
    }

    fn party(account: &dyn Account) -> Option<&dyn Account> {
        Some(account)
    }

    #[test]
    fn execute_moves_funds() {
        let a = savings("A", dec!(100));
        let b = savings("B", dec!(0));
        let mut transfer = Transfer::new(1, party(&a), party(&b), dec!(40));
        assert_eq!(transfer.status(), TransferStatus::Failed);

        transfer.execute().unwrap();
        assert!(transfer.succeeded());
        assert_eq!(transfer.status(), TransferStatus::Success);
        assert_eq!(a.balance(), dec!(60));
        assert_eq!(b.balance(), dec!(40));
    }

    #[test]
    fn execute_requires_participants() {
        let a = savings("A", dec!(100));
        let mut transfer = Transfer::new(1, party(&a), None, dec!(40));
        assert_eq!(
            transfer.execute().unwrap_err(),
            TransferError::InvalidParticipants
        );
        let mut transfer = Transfer::new(1, None, party(&a), dec!(40));
        assert_eq!(
            transfer.execute().unwrap_err(),
            TransferError::InvalidParticipants
        );
        assert_eq!(a.balance(), dec!(100));
    }

    #[test]
    fn execute_requires_positive_amount() {
        let a = savings("A", dec!(100));
        let b = savings("B", dec!(0));
        for amount in [dec!(0), dec!(-5)] {
            let mut transfer = Transfer::new(1, party(&a), party(&b), amount);
            assert_eq!(
                transfer.execute().unwrap_err(),
                TransferError::InvalidAmount { amount }
            );
        }
        assert_eq!(a.balance(), dec!(100));
        assert_eq!(b.balance(), dec!(0));
    }

    #[test]
    fn insufficient_funds_is_propagated_unchanged() {
        let a = savings("A", dec!(60));
        let b = savings("B", dec!(40));
        let mut transfer = Transfer::new(1, party(&a), party(&b), dec!(1000));

        let err = transfer.execute().unwrap_err();
        assert_eq!(
            err,
            TransferError::Withdraw(AccountError::InsufficientFunds {
                requested: dec!(1000),
                available: dec!(60),
            })
        );
        assert_eq!(
            err.to_string(),
            "Insufficient funds: requested 1000, available 60"
        );
        assert!(!transfer.succeeded());
        assert_eq!(a.balance(), dec!(60));
        assert_eq!(b.balance(), dec!(40));
    }

    #[test]
    fn failed_deposit_is_rolled_back() {
        let a = savings("A", dec!(100));
        let b = DepositRejectingAccount::new("B", dec!(0));
        let mut transfer = Transfer::new(1, party(&a), party(&b), dec!(40));

        let err = transfer.execute().unwrap_err();
        assert_eq!(err, TransferError::Deposit(AccountError::BalanceOverflow));
        assert!(!err.is_fatal());
        assert_eq!(a.balance(), dec!(100));
        assert_eq!(b.balance(), dec!(0));
    }

    #[test]
    fn failed_rollback_is_fatal() {
        let a = DepositRejectingAccount::new("A", dec!(100));
        let b = DepositRejectingAccount::new("B", dec!(0));
        let mut transfer = Transfer::new(1, party(&a), party(&b), dec!(40));

        let err = transfer.execute().unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, TransferError::RollbackFailed { .. }));
        // the withdrawn amount is unaccounted for
        assert_eq!(a.balance(), dec!(60));
        assert_eq!(b.balance(), dec!(0));
    }
}
