use crate::{
    command::{CommandArgs, CommandKind, LedgerCommand},
    ledger::Ledger,
};

use super::{CommandOutcome, CommandProcessor, ProcessError};

impl CommandProcessor for Ledger {
    fn process_command(
        &self,
        kind: CommandKind,
        args: CommandArgs,
    ) -> Result<CommandOutcome, ProcessError> {
        let outcome = match LedgerCommand::parse_command(kind, args)? {
            LedgerCommand::OpenSavings {
                id,
                balance,
                interest_rate,
            } => {
                self.open_savings_account(id.clone(), balance, interest_rate)?;
                CommandOutcome::Opened { id }
            }
            LedgerCommand::Deposit { id, amount } => {
                self.deposit(&id, amount)?;
                CommandOutcome::Deposited
            }
            LedgerCommand::Withdraw { id, amount } => {
                self.withdraw(&id, amount)?;
                CommandOutcome::Withdrawn
            }
            LedgerCommand::Balance { id } => {
                let balance = self.balance(&id)?;
                CommandOutcome::Balance { id, balance }
            }
            LedgerCommand::Transfer { from, to, amount } => CommandOutcome::Transferred {
                tx_id: self.transfer_funds(&from, &to, amount)?,
            },
            LedgerCommand::Close { id } => {
                self.close_account(&id)?;
                CommandOutcome::Closed
            }
            LedgerCommand::ApplyInterest { id } => {
                let accrued = self.apply_interest(&id)?;
                CommandOutcome::InterestApplied { id, accrued }
            }
            LedgerCommand::AccrueInterest => CommandOutcome::InterestAccrued(self.accrue_interest()),
            LedgerCommand::Report => CommandOutcome::Report(self.snapshot()?),
            LedgerCommand::History => CommandOutcome::History(self.history()),
        };
        Ok(outcome)
    }
}
