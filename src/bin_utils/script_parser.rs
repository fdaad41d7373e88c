use std::io::Read;

use crate::{
    account::AccountId,
    command::{CommandArgs, CommandKind},
};
use csv::{Position, Reader, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ScriptRow {
    pub command: CommandKind,
    pub account: Option<AccountId>,
    pub counterparty: Option<AccountId>,
    pub amount: Option<Decimal>,
    pub rate: Option<Decimal>,
}

impl ScriptRow {
    pub fn into_command(self) -> (CommandKind, CommandArgs) {
        (
            self.command,
            CommandArgs {
                account: self.account,
                counterparty: self.counterparty,
                amount: self.amount,
                rate: self.rate,
            },
        )
    }
}

/// Parses a ledger command script in CSV format
/// (`command,account,counterparty,amount,rate`), yielding each row with the
/// line it starts on.
pub struct ScriptParser<R> {
    reader: Reader<R>,
    record: StringRecord,
}

impl<R> ScriptParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(source);

        Self {
            reader,
            record: StringRecord::new(),
        }
    }
}

impl<R> Iterator for ScriptParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<ScriptRow>);

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Err(err) => Some((err.position().map_or(0, Position::line), Err(err))),
            Ok(true) => {
                let line = self.record.position().map_or(0, Position::line);
                let row = match self.reader.headers() {
                    Ok(headers) => self.record.deserialize(Some(headers)),
                    Err(err) => Err(err),
                };
                Some((line, row))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_script() {
        let script = "command,account,counterparty,amount,rate\n\
                      open, A ,,100,0.05\n\
                      # comments are skipped\n\
                      transfer,A,B,40\n\
                      report\n";
        let (lines, rows): (Vec<_>, Vec<_>) = ScriptParser::new(script.as_bytes())
            .map(|(line, row)| (line, row.unwrap()))
            .unzip();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], 2);

        assert_eq!(rows[0].command, CommandKind::Open);
        assert_eq!(rows[0].account.as_deref(), Some("A"));
        assert_eq!(rows[0].counterparty, None);
        assert_eq!(rows[0].rate, Some(dec!(0.05)));

        assert_eq!(rows[1].command, CommandKind::Transfer);
        assert_eq!(rows[1].counterparty.as_deref(), Some("B"));
        assert_eq!(rows[1].amount, Some(dec!(40)));
        assert_eq!(rows[1].rate, None);

        assert_eq!(rows[2].command, CommandKind::Report);
        assert_eq!(rows[2].account, None);
    }

    #[test]
    fn unknown_command_is_an_error() {
        let script = "command,account,counterparty,amount,rate\nsteal,A,,1,\n";
        let (_, row) = ScriptParser::new(script.as_bytes()).next().unwrap();
        assert!(row.is_err());
    }
}
