use vehicle_ledger_types::{LedgerError, MaintenanceRecord, Result, Vin};

/// Check a single vehicle history: every record belongs to `vin`, hashes are
/// intact and chained, and mileage and timestamps never decrease.
pub fn verify_records(vin: &Vin, records: &[MaintenanceRecord]) -> Result<()> {
    let violation = |index: usize, reason: String| LedgerError::IntegrityViolation {
        vin: vin.clone(),
        index,
        reason,
    };

    for (index, record) in records.iter().enumerate() {
        if &record.vin != vin {
            return Err(violation(index, format!("record belongs to {}", record.vin)));
        }
        if record.compute_hash() != record.hash {
            return Err(violation(index, "record hash mismatch".into()));
        }

        let previous = index.checked_sub(1).map(|i| &records[i]);
        if record.previous_hash.as_ref() != previous.map(|p| &p.hash) {
            return Err(violation(index, "previous hash link mismatch".into()));
        }
        if let Some(previous) = previous {
            if record.mileage < previous.mileage {
                return Err(violation(
                    index,
                    format!(
                        "mileage {} is below previous {}",
                        record.mileage, previous.mileage
                    ),
                ));
            }
            if record.timestamp < previous.timestamp {
                return Err(violation(index, "timestamp precedes previous record".into()));
            }
        }
    }
    Ok(())
}
