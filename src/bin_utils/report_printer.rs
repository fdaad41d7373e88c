use std::io::Write;

use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::LedgerSnapshot;

#[derive(Debug, Serialize)]
pub struct ReportRow<'a> {
    pub account: &'a str,
    pub balance: Decimal,
}

/// Writes active account balances as CSV followed by the total.
pub fn print_report<W>(output: &mut W, snapshot: &LedgerSnapshot) -> anyhow::Result<()>
where
    W: Write,
{
    {
        let mut writer = Writer::from_writer(&mut *output);
        // header is only emitted together with the first record
        if snapshot.balances().is_empty() {
            writer.write_record(["account", "balance"])?;
        }
        for (account, balance) in snapshot.balances() {
            if let Err(err) = writer.serialize(ReportRow {
                account,
                balance: *balance,
            }) {
                anyhow::bail!("Failed to write to CSV: {err}")
            }
        }
        if let Err(err) = writer.flush() {
            anyhow::bail!("Failed to flush CSV writer: {err}")
        }
    }
    writeln!(output, "Total Balance: {}", snapshot.total())?;
    Ok(())
}
