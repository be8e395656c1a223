//! `backfill-invoices` binary entry point.

use anyhow::Result;
use clap::Parser;

use backfill_cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    backfill_observability::init(cli.log_format.into());

    let config = cli.config();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    backfill_cli::backfill::execute(&config, &mut out)?;
    Ok(())
}
