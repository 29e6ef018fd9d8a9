use std::collections::BTreeMap;

use async_trait::async_trait;

use vehicle_ledger_types::{MaintenanceRecord, RecordDraft, RecordHandle, Result, Vin};

/// Runs inside the append's critical section, right after the record is stored.
pub type CommitHook<'a> = &'a (dyn Fn(&MaintenanceRecord) + Send + Sync);

/// Core store trait — all history backends must satisfy this.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a record to the tail of its vehicle's history.
    ///
    /// Reading the tail, the mileage check, the push and `on_commit` happen
    /// atomically with respect to other appends for the same VIN. Fails with
    /// `MileageRollback` and leaves the history untouched if the draft's
    /// mileage is below the last record's.
    async fn append(&self, draft: RecordDraft, on_commit: CommitHook<'_>) -> Result<RecordHandle>;

    /// Full history in append order. Unknown VINs yield an empty vector.
    async fn history(&self, vin: &Vin) -> Result<Vec<MaintenanceRecord>>;

    /// Most recent record for a VIN.
    async fn latest(&self, vin: &Vin) -> Result<Option<MaintenanceRecord>>;

    /// Every VIN with at least one record, sorted.
    async fn vins(&self) -> Result<Vec<Vin>>;

    /// Re-check hash chaining and mileage monotonicity of one history.
    async fn verify_history(&self, vin: &Vin) -> Result<()>;

    /// Copy of every history (for persistence and auditing).
    async fn snapshot(&self) -> Result<BTreeMap<Vin, Vec<MaintenanceRecord>>>;
}
