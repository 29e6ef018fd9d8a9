use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;

use vehicle_ledger_types::{
    LedgerError, MaintenanceRecord, RecordDraft, RecordHandle, Result, Vin,
};

use crate::clock::MonotonicClock;
use crate::integrity::verify_records;
use crate::traits::{CommitHook, HistoryStore};

type History = Arc<RwLock<Vec<MaintenanceRecord>>>;

/// In-memory history store (default).
///
/// Each VIN has its own lock, so appends to different vehicles never wait on
/// each other.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    histories: DashMap<Vin, History>,
    clock: MonotonicClock,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load previously persisted histories, rejecting any that fail verification.
    pub fn from_histories(histories: BTreeMap<Vin, Vec<MaintenanceRecord>>) -> Result<Self> {
        let store = Self::new();
        for (vin, records) in histories {
            verify_records(&vin, &records)?;
            if let Some(last) = records.last() {
                store.clock.observe(last.timestamp);
            }
            if !records.is_empty() {
                store.histories.insert(vin, Arc::new(RwLock::new(records)));
            }
        }
        tracing::debug!(vins = store.histories.len(), "History store restored");
        Ok(store)
    }

    fn slot(&self, vin: &Vin) -> Option<History> {
        self.histories.get(vin).map(|h| h.value().clone())
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, draft: RecordDraft, on_commit: CommitHook<'_>) -> Result<RecordHandle> {
        // Clone the Arc out so no map shard stays locked across the await.
        let slot = self.histories.entry(draft.vin.clone()).or_default().clone();
        let mut records = slot.write().await;

        if let Some(last) = records.last() {
            if draft.mileage < last.mileage {
                return Err(LedgerError::MileageRollback {
                    current: draft.mileage,
                    previous: last.mileage,
                });
            }
        }

        let previous_hash = records.last().map(|r| r.hash.clone());
        let record = MaintenanceRecord::new(draft, self.clock.now(), previous_hash);
        let index = records.len();
        let handle = record.handle(index);
        records.push(record);
        on_commit(&records[index]);
        Ok(handle)
    }

    async fn history(&self, vin: &Vin) -> Result<Vec<MaintenanceRecord>> {
        match self.slot(vin) {
            Some(slot) => Ok(slot.read().await.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn latest(&self, vin: &Vin) -> Result<Option<MaintenanceRecord>> {
        match self.slot(vin) {
            Some(slot) => Ok(slot.read().await.last().cloned()),
            None => Ok(None),
        }
    }

    async fn vins(&self) -> Result<Vec<Vin>> {
        let mut vins: Vec<Vin> = self.histories.iter().map(|h| h.key().clone()).collect();
        vins.sort();
        Ok(vins)
    }

    async fn verify_history(&self, vin: &Vin) -> Result<()> {
        match self.slot(vin) {
            Some(slot) => verify_records(vin, &slot.read().await),
            None => Ok(()),
        }
    }

    async fn snapshot(&self) -> Result<BTreeMap<Vin, Vec<MaintenanceRecord>>> {
        let slots: Vec<(Vin, History)> = self
            .histories
            .iter()
            .map(|h| (h.key().clone(), h.value().clone()))
            .collect();

        let mut snapshot = BTreeMap::new();
        for (vin, slot) in slots {
            snapshot.insert(vin, slot.read().await.clone());
        }
        Ok(snapshot)
    }
}
