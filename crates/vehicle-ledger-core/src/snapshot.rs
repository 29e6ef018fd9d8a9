use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use vehicle_ledger_types::{Identity, MaintenanceRecord, Vin};

/// Everything needed to rebuild a [`crate::VehicleLedger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub admin: Identity,
    pub recorders: Vec<Identity>,
    #[serde(default)]
    pub histories: BTreeMap<Vin, Vec<MaintenanceRecord>>,
}

impl LedgerSnapshot {
    pub fn record_count(&self) -> usize {
        self.histories.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VehicleLedger;

    #[tokio::test]
    async fn test_snapshot_json_keys_are_vins() {
        let ledger = VehicleLedger::new(Identity::new("admin"));
        ledger
            .append_record(&Identity::new("admin"), "ABC123", 7, "doc", "Accident")
            .await
            .unwrap();

        let snapshot = ledger.snapshot().await.unwrap();
        assert_eq!(snapshot.record_count(), 1);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["admin"], "admin");
        assert_eq!(json["histories"]["ABC123"][0]["category"], "Accident");

        let parsed: LedgerSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
