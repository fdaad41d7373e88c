use std::collections::BTreeMap;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::AccountId,
    command::{CommandArgs, CommandError, CommandKind},
    history::{HistoryEntry, TransactionId},
    ledger::{LedgerError, LedgerSnapshot},
};

pub mod ledger_processor;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    LedgerErr(#[from] LedgerError),
}

impl ProcessError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProcessError::LedgerErr(err) if err.is_fatal())
    }
}

/// What a successfully processed command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Opened { id: AccountId },
    Deposited,
    Withdrawn,
    Balance { id: AccountId, balance: Decimal },
    Transferred { tx_id: TransactionId },
    Closed,
    InterestApplied { id: AccountId, accrued: Decimal },
    InterestAccrued(BTreeMap<AccountId, Decimal>),
    Report(LedgerSnapshot),
    History(Vec<HistoryEntry>),
}

pub trait CommandProcessor {
    fn process_command(
        &self,
        kind: CommandKind,
        args: CommandArgs,
    ) -> Result<CommandOutcome, ProcessError>;
}
