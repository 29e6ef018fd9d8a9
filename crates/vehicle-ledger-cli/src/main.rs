use anyhow::Result;
use clap::Parser;

use vehicle_ledger_cli::{Cli, FileStore, LedgerConfig, commands, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let state_dir = cli
        .state_dir
        .clone()
        .unwrap_or_else(FileStore::default_state_dir);
    let config = LedgerConfig::load(&state_dir)?;
    logging::init(&config);

    commands::run(cli.command, &state_dir, &config).await
}
