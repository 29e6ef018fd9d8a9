use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::identity::{Identity, Vin};

/// Kind of service event a record describes.
///
/// The set is open: any string that is not one of the well-known tags is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordCategory {
    Maintenance,
    Repair,
    Accident,
    Other(String),
}

impl RecordCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::Repair => "Repair",
            Self::Accident => "Accident",
            Self::Other(tag) => tag,
        }
    }

    pub fn is_well_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for RecordCategory {
    fn from(tag: &str) -> Self {
        match tag {
            "Maintenance" => Self::Maintenance,
            "Repair" => Self::Repair,
            "Accident" => Self::Accident,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for RecordCategory {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Maintenance" | "Repair" | "Accident" => Self::from(tag.as_str()),
            _ => Self::Other(tag),
        }
    }
}

impl From<RecordCategory> for String {
    fn from(category: RecordCategory) -> Self {
        match category {
            RecordCategory::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Caller-supplied part of a record; the store fills in the rest on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub vin: Vin,
    pub mileage: u64,
    pub content_ref: String,
    pub category: RecordCategory,
    pub recorder: Identity,
}

/// An immutable entry in a vehicle's service history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub vin: Vin,
    pub timestamp: DateTime<Utc>,
    pub mileage: u64,
    /// Opaque pointer to externally stored detail, e.g. a document hash.
    pub content_ref: String,
    pub category: RecordCategory,
    pub recorder: Identity,
    pub previous_hash: Option<String>,
    pub hash: String,
}

impl MaintenanceRecord {
    pub fn new(draft: RecordDraft, timestamp: DateTime<Utc>, previous_hash: Option<String>) -> Self {
        let mut record = Self {
            id: Uuid::new_v4(),
            vin: draft.vin,
            timestamp,
            mileage: draft.mileage,
            content_ref: draft.content_ref,
            category: draft.category,
            recorder: draft.recorder,
            previous_hash,
            hash: String::new(),
        };
        record.hash = record.compute_hash();
        record
    }

    /// SHA-256 over every attribute except `hash` itself.
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for field in [
            self.id.to_string(),
            self.vin.to_string(),
            self.timestamp.timestamp_nanos_opt().unwrap_or(0).to_string(),
            self.mileage.to_string(),
            self.content_ref.clone(),
            self.category.to_string(),
            self.recorder.to_string(),
            self.previous_hash.clone().unwrap_or_else(|| "genesis".into()),
        ] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn handle(&self, index: usize) -> RecordHandle {
        RecordHandle {
            id: self.id,
            vin: self.vin.clone(),
            index,
            hash: self.hash.clone(),
        }
    }
}

/// Returned by a successful append; locates the committed record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordHandle {
    pub id: Uuid,
    pub vin: Vin,
    /// Zero-based position in the vehicle's history.
    pub index: usize,
    pub hash: String,
}
