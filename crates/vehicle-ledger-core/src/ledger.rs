use std::sync::Arc;

use vehicle_ledger_access::{AccessRegistry, RecorderSet};
use vehicle_ledger_store::{HistoryStore, InMemoryHistoryStore};
use vehicle_ledger_types::{
    EventBus, EventStream, Identity, LedgerEvent, MaintenanceRecord, RecordCategory,
    RecordDraft, RecordHandle, Result, Vin,
};

use crate::snapshot::LedgerSnapshot;

/// Authorization-gated, append-only service history for vehicles.
///
/// Every successful mutation emits exactly one [`LedgerEvent`]; failed calls
/// change nothing and emit nothing.
pub struct VehicleLedger {
    registry: AccessRegistry,
    store: Arc<dyn HistoryStore>,
    events: EventBus,
}

impl VehicleLedger {
    /// Initialize a fresh ledger administered by `initiator`.
    pub fn new(initiator: Identity) -> Self {
        Self::with_events(initiator, EventBus::default())
    }

    /// Initialize with the in-memory store and a caller-provided event bus.
    pub fn with_events(initiator: Identity, events: EventBus) -> Self {
        Self::with_store(initiator, Arc::new(InMemoryHistoryStore::new()), events)
    }

    pub fn with_store(initiator: Identity, store: Arc<dyn HistoryStore>, events: EventBus) -> Self {
        Self {
            registry: AccessRegistry::new(initiator, events.clone()),
            store,
            events,
        }
    }

    /// Rebuild a ledger from a snapshot. Histories are re-verified first.
    pub fn restore(snapshot: LedgerSnapshot, events: EventBus) -> Result<Self> {
        let recorders: RecorderSet = snapshot.recorders.into_iter().collect();
        let store = InMemoryHistoryStore::from_histories(snapshot.histories)?;
        tracing::info!(
            admin = %snapshot.admin,
            recorders = recorders.len(),
            "Ledger restored from snapshot"
        );
        Ok(Self {
            registry: AccessRegistry::restore(snapshot.admin, recorders, events.clone()),
            store: Arc::new(store),
            events,
        })
    }

    pub async fn snapshot(&self) -> Result<LedgerSnapshot> {
        Ok(LedgerSnapshot {
            admin: self.registry.admin().clone(),
            recorders: self.registry.recorders().await.to_sorted_vec(),
            histories: self.store.snapshot().await?,
        })
    }

    pub fn admin(&self) -> &Identity {
        self.registry.admin()
    }

    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    pub async fn authorize(&self, caller: &Identity, target: Identity) -> Result<()> {
        self.registry.authorize(caller, target).await
    }

    pub async fn revoke(&self, caller: &Identity, target: Identity) -> Result<()> {
        self.registry.revoke(caller, target).await
    }

    pub async fn is_authorized(&self, id: &Identity) -> bool {
        self.registry.is_authorized(id).await
    }

    pub async fn recorders(&self) -> Vec<Identity> {
        self.registry.recorders().await.to_sorted_vec()
    }

    /// Append a service record for `vin`.
    ///
    /// Authorization is checked once, and the recorder permit is held until
    /// the record and its `RecordAdded` event are committed.
    pub async fn append_record(
        &self,
        caller: &Identity,
        vin: &str,
        mileage: u64,
        content_ref: impl Into<String>,
        category: impl Into<RecordCategory>,
    ) -> Result<RecordHandle> {
        let permit = self.registry.recording_permit(caller).await?;
        let vin = Vin::parse(vin).inspect_err(|_| {
            tracing::warn!(%caller, "Rejected append with empty VIN");
        })?;

        let draft = RecordDraft {
            vin,
            mileage,
            content_ref: content_ref.into(),
            category: category.into(),
            recorder: permit.caller().clone(),
        };

        let events = &self.events;
        let on_commit = |record: &MaintenanceRecord| {
            events.emit(LedgerEvent::RecordAdded {
                vin: record.vin.clone(),
                mileage: record.mileage,
                category: record.category.clone(),
                recorder: record.recorder.clone(),
            });
        };

        match self.store.append(draft, &on_commit).await {
            Ok(handle) => {
                tracing::info!(
                    vin = %handle.vin,
                    index = handle.index,
                    mileage,
                    recorder = %caller,
                    "Record appended"
                );
                Ok(handle)
            }
            Err(err) => {
                tracing::warn!(%caller, mileage, error = %err, "Append rejected");
                Err(err)
            }
        }
    }

    /// Records for `vin` in append order; empty for an unknown VIN.
    pub async fn history(&self, vin: &str) -> Result<Vec<MaintenanceRecord>> {
        let Ok(vin) = Vin::parse(vin) else {
            return Ok(Vec::new());
        };
        let records = self.store.history(&vin).await?;
        tracing::debug!(%vin, records = records.len(), "History read");
        Ok(records)
    }

    pub async fn latest_record(&self, vin: &str) -> Result<Option<MaintenanceRecord>> {
        match Vin::parse(vin) {
            Ok(vin) => self.store.latest(&vin).await,
            Err(_) => Ok(None),
        }
    }

    pub async fn vins(&self) -> Result<Vec<Vin>> {
        self.store.vins().await
    }

    /// Re-check hash chaining and mileage monotonicity for one vehicle.
    pub async fn verify_history(&self, vin: &str) -> Result<()> {
        let vin = Vin::parse(vin)?;
        self.store.verify_history(&vin).await
    }

    /// Merkle root over a vehicle's record hashes, if it has any records.
    #[cfg(feature = "merkle")]
    pub async fn history_root(&self, vin: &str) -> Result<Option<String>> {
        let records = self.history(vin).await?;
        Ok(vehicle_ledger_store::HistoryTree::from_records(&records).root_hex())
    }

    /// Inclusion proof for the record at `index` of `vin`'s history.
    #[cfg(feature = "merkle")]
    pub async fn inclusion_proof(&self, vin: &str, index: usize) -> Result<Option<Vec<u8>>> {
        let records = self.history(vin).await?;
        Ok(vehicle_ledger_store::HistoryTree::from_records(&records).proof(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vehicle_ledger_types::LedgerError;

    fn admin() -> Identity {
        Identity::new("0xadmin")
    }

    #[tokio::test]
    async fn test_successful_append_and_query() {
        let ledger = VehicleLedger::new(admin());
        let before = Utc::now();

        let handle = ledger
            .append_record(&admin(), "XYZ999", 1000, "hashA", "Maintenance")
            .await
            .unwrap();
        assert_eq!(handle.index, 0);

        let history = ledger.history("XYZ999").await.unwrap();
        assert_eq!(history.len(), 1);
        let record = &history[0];
        assert_eq!(record.mileage, 1000);
        assert_eq!(record.category, RecordCategory::Maintenance);
        assert_eq!(record.content_ref, "hashA");
        assert_eq!(record.recorder, admin());
        assert!(record.timestamp >= before);
    }

    #[tokio::test]
    async fn test_rollback_rejected() {
        let ledger = VehicleLedger::new(admin());
        ledger
            .append_record(&admin(), "ABC123", 500, "ref", "Maintenance")
            .await
            .unwrap();

        let err = ledger
            .append_record(&admin(), "ABC123", 400, "ref", "Repair")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::MileageRollback {
                current: 400,
                previous: 500
            }
        );
        assert_eq!(ledger.history("ABC123").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_vin_rejected() {
        let ledger = VehicleLedger::new(admin());
        let err = ledger
            .append_record(&admin(), "", 100, "ref", "Maintenance")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
        assert!(ledger.vins().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authorization_checked_before_input() {
        let ledger = VehicleLedger::new(admin());
        let err = ledger
            .append_record(&Identity::new("intruder"), "", 100, "ref", "Maintenance")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_unknown_and_empty_vin_queries_are_empty() {
        let ledger = VehicleLedger::new(admin());
        assert!(ledger.history("NO-SUCH-VIN").await.unwrap().is_empty());
        assert!(ledger.history("").await.unwrap().is_empty());
        assert!(ledger.latest_record("NO-SUCH-VIN").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_events_follow_commits_only() {
        let ledger = VehicleLedger::new(admin());
        let mut events = ledger.subscribe();
        let garage = Identity::new("garage");

        ledger.authorize(&admin(), garage.clone()).await.unwrap();
        ledger
            .append_record(&garage, "VIN1", 10, "doc", "Tire Rotation")
            .await
            .unwrap();
        let _ = ledger.append_record(&garage, "VIN1", 5, "doc", "Repair").await;
        let _ = ledger.authorize(&garage, Identity::new("friend")).await;
        ledger.revoke(&admin(), garage.clone()).await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            LedgerEvent::RecorderAuthorized {
                target: garage.clone()
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            LedgerEvent::RecordAdded {
                vin: Vin::parse("VIN1").unwrap(),
                mileage: 10,
                category: RecordCategory::Other("Tire Rotation".into()),
                recorder: garage.clone(),
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            LedgerEvent::RecorderRevoked { target: garage }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_snapshot_restore_preserves_state() {
        let ledger = VehicleLedger::new(admin());
        let garage = Identity::new("garage");
        ledger.authorize(&admin(), garage.clone()).await.unwrap();
        ledger
            .append_record(&garage, "VIN1", 10, "doc", "Repair")
            .await
            .unwrap();

        let snapshot = ledger.snapshot().await.unwrap();
        let restored = VehicleLedger::restore(snapshot, EventBus::default()).unwrap();

        assert_eq!(restored.admin(), &admin());
        assert!(restored.is_authorized(&garage).await);
        assert_eq!(
            restored.history("VIN1").await.unwrap(),
            ledger.history("VIN1").await.unwrap()
        );
        let err = restored
            .append_record(&garage, "VIN1", 9, "doc", "Repair")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::MileageRollback { previous: 10, .. }));
    }

    #[cfg(feature = "merkle")]
    #[tokio::test]
    async fn test_history_root_and_proof() {
        let ledger = VehicleLedger::new(admin());
        assert!(ledger.history_root("VIN1").await.unwrap().is_none());

        for mileage in [100, 200, 300] {
            ledger
                .append_record(&admin(), "VIN1", mileage, "doc", "Maintenance")
                .await
                .unwrap();
        }
        assert!(ledger.history_root("VIN1").await.unwrap().is_some());

        let records = ledger.history("VIN1").await.unwrap();
        let tree = vehicle_ledger_store::HistoryTree::from_records(&records);
        let proof = ledger.inclusion_proof("VIN1", 1).await.unwrap().unwrap();
        assert!(vehicle_ledger_store::verify_inclusion(
            tree.root().unwrap(),
            &records[1],
            1,
            records.len(),
            &proof
        ));
        assert!(ledger.inclusion_proof("VIN1", 3).await.unwrap().is_none());
    }
}
