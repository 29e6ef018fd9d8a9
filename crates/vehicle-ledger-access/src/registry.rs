use tokio::sync::{RwLock, RwLockReadGuard};

use vehicle_ledger_types::{EventBus, Identity, LedgerError, LedgerEvent, Result};

use crate::recorders::RecorderSet;

/// Decides who may administer the whitelist and who may append records.
///
/// The admin is fixed at construction. Admin rights and recorder rights are
/// checked independently: the admin starts out as a recorder, but losing that
/// status would not take away admin rights.
#[derive(Debug)]
pub struct AccessRegistry {
    admin: Identity,
    recorders: RwLock<RecorderSet>,
    events: EventBus,
}

/// Proof that a caller was a recorder when the permit was taken.
///
/// Holding it keeps `authorize`/`revoke` from running, so an append that
/// started authorized commits before any revocation takes effect.
pub struct RecordingPermit<'a> {
    caller: Identity,
    _recorders: RwLockReadGuard<'a, RecorderSet>,
}

impl RecordingPermit<'_> {
    pub fn caller(&self) -> &Identity {
        &self.caller
    }
}

impl AccessRegistry {
    /// Construct the registry with `initiator` as admin and first recorder.
    pub fn new(initiator: Identity, events: EventBus) -> Self {
        let mut recorders = RecorderSet::new();
        recorders.grant(initiator.clone());
        tracing::info!(admin = %initiator, "Access registry initialized");
        Self {
            admin: initiator,
            recorders: RwLock::new(recorders),
            events,
        }
    }

    /// Rebuild a registry from persisted state without re-running initialization.
    pub fn restore(admin: Identity, recorders: RecorderSet, events: EventBus) -> Self {
        Self {
            admin,
            recorders: RwLock::new(recorders),
            events,
        }
    }

    pub fn admin(&self) -> &Identity {
        &self.admin
    }

    pub fn is_admin(&self, id: &Identity) -> bool {
        &self.admin == id
    }

    fn ensure_admin(&self, caller: &Identity, action: &str) -> Result<()> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            tracing::warn!(%caller, action, "Rejected non-admin call");
            Err(LedgerError::unauthorized(caller, action))
        }
    }

    /// Grant recorder status. Re-authorizing succeeds and notifies again.
    pub async fn authorize(&self, caller: &Identity, target: Identity) -> Result<()> {
        self.ensure_admin(caller, "authorize recorders")?;

        let mut recorders = self.recorders.write().await;
        let newly_added = recorders.grant(target.clone());
        tracing::info!(%target, newly_added, "Recorder authorized");
        self.events.emit(LedgerEvent::RecorderAuthorized { target });
        Ok(())
    }

    /// Remove recorder status. Revoking a non-recorder succeeds and notifies.
    pub async fn revoke(&self, caller: &Identity, target: Identity) -> Result<()> {
        self.ensure_admin(caller, "revoke recorders")?;

        let mut recorders = self.recorders.write().await;
        let was_recorder = recorders.revoke(&target);
        tracing::info!(%target, was_recorder, "Recorder revoked");
        self.events.emit(LedgerEvent::RecorderRevoked { target });
        Ok(())
    }

    pub async fn is_authorized(&self, id: &Identity) -> bool {
        self.recorders.read().await.contains(id)
    }

    /// Check recorder status and hold it for the duration of an append.
    pub async fn recording_permit(&self, caller: &Identity) -> Result<RecordingPermit<'_>> {
        let recorders = self.recorders.read().await;
        if !recorders.contains(caller) {
            tracing::warn!(%caller, "Rejected append from non-recorder");
            return Err(LedgerError::unauthorized(caller, "append records"));
        }
        Ok(RecordingPermit {
            caller: caller.clone(),
            _recorders: recorders,
        })
    }

    pub async fn recorders(&self) -> RecorderSet {
        self.recorders.read().await.clone()
    }
}
