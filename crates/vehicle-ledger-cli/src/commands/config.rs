use anyhow::Result;
use std::path::Path;

use crate::cli::ConfigAction;
use crate::config::LedgerConfig;

/// Handle config subcommands.
pub async fn handle(action: ConfigAction, state_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = LedgerConfig::config_path(state_dir);
            if path.exists() {
                println!("Config already exists at: {}", path.display());
                println!("Use `vehicle-ledger config show` to view it.");
                return Ok(());
            }

            let config = LedgerConfig::default();
            config.save(state_dir)?;
            println!("Created default config at: {}", path.display());
            println!();
            print_config(state_dir, &config);
        }

        ConfigAction::Show => {
            let config = LedgerConfig::load(state_dir)?;
            print_config(state_dir, &config);
        }
    }
    Ok(())
}

fn print_config(state_dir: &Path, config: &LedgerConfig) {
    println!("Configuration:");
    println!("  state_dir:       {}", state_dir.display());
    println!("  log_level:       {}", config.log_level);
    println!("  log_json:        {}", config.log_json);
    println!("  event_capacity:  {}", config.event_capacity);
}
