use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vehicle-ledger", about = "Append-only vehicle service history ledger")]
pub struct Cli {
    /// State directory (defaults to $VEHICLE_LEDGER_STATE_DIR or ~/.vehicle-ledger)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new ledger administered by the given identity
    Init {
        #[arg(long)]
        admin: String,
    },
    /// Grant recorder status (admin only)
    Authorize {
        /// Calling identity
        #[arg(long)]
        caller: String,
        /// Identity to authorize
        target: String,
    },
    /// Remove recorder status (admin only)
    Revoke {
        /// Calling identity
        #[arg(long)]
        caller: String,
        /// Identity to revoke
        target: String,
    },
    /// Check whether an identity may append records
    IsAuthorized { id: String },
    /// Append a service record
    Append {
        /// Calling identity
        #[arg(long)]
        caller: String,
        #[arg(long)]
        vin: String,
        #[arg(long)]
        mileage: u64,
        /// Reference to the externally stored document (e.g. a content hash)
        #[arg(long)]
        content_ref: String,
        /// Maintenance, Repair, Accident, or any other tag
        #[arg(long, default_value = "Maintenance")]
        category: String,
    },
    /// Show a vehicle's service history
    History {
        vin: String,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify hash chaining and mileage monotonicity (all vehicles if no VIN)
    Verify { vin: Option<String> },
    /// Print the Merkle root of a vehicle's history
    Root { vin: String },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a default config file
    Init,
    /// Show the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_append() {
        let cli = Cli::try_parse_from([
            "vehicle-ledger",
            "append",
            "--caller",
            "garage",
            "--vin",
            "ABC123",
            "--mileage",
            "1500",
            "--content-ref",
            "QmDoc",
        ])
        .unwrap();
        match cli.command {
            Commands::Append {
                mileage, category, ..
            } => {
                assert_eq!(mileage, 1500);
                assert_eq!(category, "Maintenance");
            }
            _ => panic!("Expected append"),
        }
    }

    #[test]
    fn test_negative_mileage_is_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "vehicle-ledger",
            "append",
            "--caller",
            "garage",
            "--vin",
            "ABC123",
            "--mileage",
            "-5",
            "--content-ref",
            "QmDoc",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_state_dir() {
        let cli =
            Cli::try_parse_from(["vehicle-ledger", "history", "ABC123", "--state-dir", "/tmp/x"])
                .unwrap();
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/x")));
    }
}
