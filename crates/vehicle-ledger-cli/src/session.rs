use anyhow::{Context, Result, bail};
use std::path::Path;

use vehicle_ledger_core::VehicleLedger;
use vehicle_ledger_types::{EventBus, EventStream, Identity, LedgerEvent};

use crate::config::LedgerConfig;
use crate::persistence::FileStore;

/// A ledger loaded from the state directory for the duration of one command.
pub struct LedgerSession {
    store: FileStore,
    ledger: VehicleLedger,
    events: EventStream,
}

impl LedgerSession {
    /// Initialize a new ledger on disk. Fails if one already exists.
    pub async fn create(state_dir: &Path, config: &LedgerConfig, admin: Identity) -> Result<Self> {
        let store = FileStore::new(state_dir);
        if store.exists() {
            bail!("Ledger already initialized at {}", store.path().display());
        }
        let ledger = VehicleLedger::with_events(admin, EventBus::new(config.event_capacity));
        let events = ledger.subscribe();
        let session = Self {
            store,
            ledger,
            events,
        };
        session.persist().await?;
        Ok(session)
    }

    /// Open an existing ledger.
    pub fn open(state_dir: &Path, config: &LedgerConfig) -> Result<Self> {
        let store = FileStore::new(state_dir);
        let Some(snapshot) = store.load()? else {
            bail!(
                "No ledger at {}; run `vehicle-ledger init --admin <id>` first",
                store.path().display()
            );
        };
        let ledger = VehicleLedger::restore(snapshot, EventBus::new(config.event_capacity))
            .context("Persisted ledger failed verification")?;
        let events = ledger.subscribe();
        Ok(Self {
            store,
            ledger,
            events,
        })
    }

    pub fn ledger(&self) -> &VehicleLedger {
        &self.ledger
    }

    /// Write the current state back to disk.
    pub async fn persist(&self) -> Result<()> {
        let snapshot = self.ledger.snapshot().await?;
        self.store.save(&snapshot)?;
        tracing::debug!(
            path = %self.store.path().display(),
            records = snapshot.record_count(),
            "Ledger persisted"
        );
        Ok(())
    }

    /// Events emitted since the session was opened or last drained.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_then_open() {
        let dir = tempdir().unwrap();
        let config = LedgerConfig::default();
        let admin = Identity::new("admin");

        let session = LedgerSession::create(dir.path(), &config, admin.clone())
            .await
            .unwrap();
        session
            .ledger()
            .append_record(&admin, "VIN1", 10, "doc", "Repair")
            .await
            .unwrap();
        session.persist().await.unwrap();

        let reopened = LedgerSession::open(dir.path(), &config).unwrap();
        assert_eq!(reopened.ledger().admin(), &admin);
        assert_eq!(reopened.ledger().history("VIN1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let dir = tempdir().unwrap();
        let config = LedgerConfig::default();
        LedgerSession::create(dir.path(), &config, Identity::new("a"))
            .await
            .unwrap();
        assert!(
            LedgerSession::create(dir.path(), &config, Identity::new("b"))
                .await
                .is_err()
        );
    }

    #[test]
    fn test_open_uninitialized_fails() {
        let dir = tempdir().unwrap();
        assert!(LedgerSession::open(dir.path(), &LedgerConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_drain_events() {
        let dir = tempdir().unwrap();
        let admin = Identity::new("admin");
        let mut session = LedgerSession::create(dir.path(), &LedgerConfig::default(), admin.clone())
            .await
            .unwrap();
        session
            .ledger()
            .authorize(&admin, Identity::new("garage"))
            .await
            .unwrap();

        let events = session.drain_events();
        assert_eq!(
            events,
            vec![LedgerEvent::RecorderAuthorized {
                target: Identity::new("garage")
            }]
        );
        assert!(session.drain_events().is_empty());
    }
}
