use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use vehicle_ledger_core::LedgerSnapshot;

/// File-based ledger store with atomic writes.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join("ledger.json"),
        }
    }

    /// Default state directory: `~/.vehicle-ledger/` or `$VEHICLE_LEDGER_STATE_DIR`.
    pub fn default_state_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("VEHICLE_LEDGER_STATE_DIR") {
            PathBuf::from(dir)
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".vehicle-ledger")
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the snapshot, or `None` if the ledger was never initialized.
    pub fn load(&self) -> Result<Option<LedgerSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).context("Failed to read ledger file")?;
        let snapshot: LedgerSnapshot =
            serde_json::from_str(&content).context("Failed to parse ledger file")?;
        Ok(Some(snapshot))
    }

    /// Save the snapshot using atomic write (.tmp → rename).
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let content =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize ledger")?;
        std::fs::write(&tmp_path, content).context("Failed to write temp ledger file")?;
        std::fs::rename(&tmp_path, &self.path).context("Failed to rename temp ledger file")?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
