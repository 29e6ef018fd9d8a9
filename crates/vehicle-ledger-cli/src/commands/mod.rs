pub mod config;
pub mod ledger;

use anyhow::Result;
use std::path::Path;

use crate::cli::Commands;
use crate::config::LedgerConfig;

/// Dispatch a parsed command.
pub async fn run(command: Commands, state_dir: &Path, config: &LedgerConfig) -> Result<()> {
    match command {
        Commands::Init { admin } => ledger::init(state_dir, config, admin).await,
        Commands::Authorize { caller, target } => {
            ledger::authorize(state_dir, config, caller, target).await
        }
        Commands::Revoke { caller, target } => {
            ledger::revoke(state_dir, config, caller, target).await
        }
        Commands::IsAuthorized { id } => ledger::is_authorized(state_dir, config, id).await,
        Commands::Append {
            caller,
            vin,
            mileage,
            content_ref,
            category,
        } => {
            let request = ledger::AppendRequest {
                caller,
                vin,
                mileage,
                content_ref,
                category,
            };
            ledger::append(state_dir, config, request).await
        }
        Commands::History { vin, json } => ledger::history(state_dir, config, vin, json).await,
        Commands::Verify { vin } => ledger::verify(state_dir, config, vin).await,
        Commands::Root { vin } => ledger::root(state_dir, config, vin).await,
        Commands::Config { action } => config::handle(action, state_dir).await,
    }
}
