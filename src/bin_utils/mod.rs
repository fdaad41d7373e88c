//! Bootstraps [`crate::ledger::Ledger`] for the binary: runs a command script
//! against a fresh ledger and prints the outcome.

use std::io::{Read, Write};

use crate::{
    history::HistoryEntry,
    ledger::Ledger,
    processor::{CommandOutcome, CommandProcessor, ProcessError},
};
use anyhow::{Context, Result};
use report_printer::print_report;
use script_parser::ScriptParser;
use tracing::{error, info};

pub mod report_printer;
pub mod script_parser;

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    /// Print the transaction history after the final report.
    pub show_history: bool,
    pub error_printer: Box<dyn FnMut(u64, ProcessError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    /// Stops at the first malformed row or fatal ledger inconsistency; every
    /// other failure goes to the error printer and the script continues.
    pub fn run(mut self) -> Result<()> {
        let ledger = Ledger::new();

        for (line, row) in ScriptParser::new(self.input) {
            let row = row.with_context(|| format!("Malformed command at line {line}"))?;
            let (kind, args) = row.into_command();
            match ledger.process_command(kind, args) {
                Ok(outcome) => print_outcome(self.output, &outcome)?,
                Err(err) if err.is_fatal() => {
                    error!(line, %err, "ledger is inconsistent, stopping");
                    return Err(err).with_context(|| {
                        format!("Fatal ledger inconsistency at line {line}")
                    });
                }
                Err(err) => (self.error_printer)(line, err),
            }
        }

        let snapshot = ledger.snapshot()?;
        info!(
            accounts = snapshot.balances().len(),
            total = %snapshot.total(),
            "script finished"
        );
        print_report(self.output, &snapshot)?;
        if self.show_history {
            ledger.display_transaction_history(self.output)?;
        }
        Ok(())
    }
}

fn print_outcome<W: Write>(output: &mut W, outcome: &CommandOutcome) -> Result<()> {
    match outcome {
        CommandOutcome::Balance { id, balance } => {
            writeln!(output, "Balance for {id} is {balance:.2}")?;
        }
        CommandOutcome::Report(snapshot) => print_report(output, snapshot)?,
        CommandOutcome::History(entries) => print_history(output, entries)?,
        // mutations are silent, the final report shows their effect
        _ => {}
    }
    Ok(())
}

fn print_history<W: Write>(output: &mut W, entries: &[HistoryEntry]) -> Result<()> {
    writeln!(output, "Transaction History:")?;
    for entry in entries {
        writeln!(output, "{entry}")?;
    }
    writeln!(output, "END")?;
    Ok(())
}
