use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::account::AccountId;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Open,
    Deposit,
    Withdraw,
    Balance,
    Transfer,
    Close,
    Interest,
    Accrue,
    Report,
    History,
}

/// Raw, optional arguments of a command as they come from the caller.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    pub account: Option<AccountId>,
    pub counterparty: Option<AccountId>,
    pub amount: Option<Decimal>,
    pub rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    OpenSavings {
        id: AccountId,
        balance: Decimal,
        interest_rate: Decimal,
    },
    Deposit {
        id: AccountId,
        amount: Decimal,
    },
    Withdraw {
        id: AccountId,
        amount: Decimal,
    },
    Balance {
        id: AccountId,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },
    Close {
        id: AccountId,
    },
    ApplyInterest {
        id: AccountId,
    },
    AccrueInterest,
    Report,
    History,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Account id is required for {kind:?}")]
    AccountRequired { kind: CommandKind },
    #[error("Counterparty account id is required for {kind:?}")]
    CounterpartyRequired { kind: CommandKind },
    #[error("Amount is required for {kind:?}")]
    AmountRequired { kind: CommandKind },
}

impl LedgerCommand {
    pub fn parse_command(kind: CommandKind, args: CommandArgs) -> Result<Self, CommandError> {
        let CommandArgs {
            account,
            counterparty,
            amount,
            rate,
        } = args;
        // empty ids count as missing
        let account = account.filter(|id| !id.is_empty());
        let counterparty = counterparty.filter(|id| !id.is_empty());
        let required_account = || account.ok_or(CommandError::AccountRequired { kind });
        let required_amount = || amount.ok_or(CommandError::AmountRequired { kind });

        match kind {
            CommandKind::Open => Ok(Self::OpenSavings {
                id: required_account()?,
                balance: required_amount()?,
                interest_rate: rate.unwrap_or_default(),
            }),
            CommandKind::Deposit => Ok(Self::Deposit {
                id: required_account()?,
                amount: required_amount()?,
            }),
            CommandKind::Withdraw => Ok(Self::Withdraw {
                id: required_account()?,
                amount: required_amount()?,
            }),
            CommandKind::Balance => Ok(Self::Balance {
                id: required_account()?,
            }),
            CommandKind::Transfer => Ok(Self::Transfer {
                from: required_account()?,
                to: counterparty.ok_or(CommandError::CounterpartyRequired { kind })?,
                amount: required_amount()?,
            }),
            CommandKind::Close => Ok(Self::Close {
                id: required_account()?,
            }),
            CommandKind::Interest => Ok(Self::ApplyInterest {
                id: required_account()?,
            }),
            CommandKind::Accrue => Ok(Self::AccrueInterest),
            CommandKind::Report => Ok(Self::Report),
            CommandKind::History => Ok(Self::History),
        }
    }
}
