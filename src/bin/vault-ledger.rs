use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vault_ledger::{bin_utils::Service, processor::ProcessError};

#[derive(Parser)]
#[command(name = "vault-ledger")]
#[command(about = "Run a ledger command script and print the resulting balances")]
struct Cli {
    /// CSV script with `command,account,counterparty,amount,rate` rows
    script: PathBuf,
    /// Print the transaction history after the report
    #[arg(long)]
    history: bool,
    /// Default log directive, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&cli.log_level))
                .context("Invalid log level")?,
        )
        .init();

    let file = File::open(&cli.script)
        .with_context(|| format!("Failed to open `{}`", cli.script.display()))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        show_history: cli.history,
        error_printer: Box::new(|line: u64, err: ProcessError| match err {
            ProcessError::CommandErr(err) => eprintln!("Error at line {line}: {err}"),
            ProcessError::LedgerErr(err) => eprintln!("Rejected at line {line}: {err}"),
        }),
    };
    service.run()
}
