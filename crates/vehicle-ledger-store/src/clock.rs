use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

/// Wall clock that never goes backwards within a process.
///
/// Two calls in the same instant may return the same timestamp.
#[derive(Debug)]
pub struct MonotonicClock {
    last: Mutex<DateTime<Utc>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now().max(*last);
        *last = now;
        now
    }

    /// Make sure later readings are not earlier than `timestamp`.
    pub fn observe(&self, timestamp: DateTime<Utc>) {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if timestamp > *last {
            *last = timestamp;
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
