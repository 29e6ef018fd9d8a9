use thiserror::Error;

use crate::identity::{Identity, Vin};

/// Every failure the ledger core can report to a caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Unauthorized: {caller} may not {action}")]
    Unauthorized { caller: Identity, action: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Mileage rollback: {current} is below the previous reading of {previous}")]
    MileageRollback { current: u64, previous: u64 },

    #[error("Integrity violation in history of {vin} at record {index}: {reason}")]
    IntegrityViolation {
        vin: Vin,
        index: usize,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn unauthorized(caller: &Identity, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            caller: caller.clone(),
            action: action.into(),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
