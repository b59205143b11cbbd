//! [`EncryptedContext`]: a unit of work that encrypts on save and decrypts on
//! read.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{CallerAccessor, Change, EntryState, Persistence, StoreError};
use crate::registry::Record;
use crate::sweep::FieldSweeper;

/// Wraps a [`Persistence`] backend with the field sweep.
///
/// Changes are queued with [`add`](Self::add), [`update`](Self::update) and
/// [`remove`](Self::remove) and written by [`save_changes`](Self::save_changes).
/// Reads go straight to the backend and are decrypted for the caller returned
/// by the [`CallerAccessor`]; without a caller, records come back sealed.
pub struct EncryptedContext<T: Record, P> {
    inner: P,
    sweeper: FieldSweeper,
    callers: Arc<dyn CallerAccessor>,
    pending: Vec<Change<T>>,
}

impl<T: Record, P: Persistence<T>> EncryptedContext<T, P> {
    pub fn new(inner: P, sweeper: FieldSweeper, callers: Arc<dyn CallerAccessor>) -> Self {
        Self {
            inner,
            sweeper,
            callers,
            pending: Vec::new(),
        }
    }

    /// Queue a new record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Redacted`] if `record` holds access-denied
    /// sentinels.
    pub fn add(&mut self, record: T) -> Result<(), StoreError> {
        self.track(EntryState::Added, record)
    }

    /// Queue a modified record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Redacted`] if `record` holds access-denied
    /// sentinels.
    pub fn update(&mut self, record: T) -> Result<(), StoreError> {
        self.track(EntryState::Modified, record)
    }

    /// Queue a deletion.
    pub fn remove(&mut self, record: T) {
        self.pending.push(Change::new(EntryState::Deleted, record));
    }

    /// Number of queued changes.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn track(&mut self, state: EntryState, record: T) -> Result<(), StoreError> {
        if record.seal().is_redacted() {
            warn!(entity = T::KIND, "refusing to track a redacted record");
            return Err(StoreError::Redacted { kind: T::KIND });
        }
        self.pending.push(Change::new(state, record));
        Ok(())
    }

    /// Encrypt every queued create and update, then hand the unit to the
    /// backend. Returns the backend's count of written records.
    ///
    /// On error the queue is kept as it was, so the call can be retried.
    ///
    /// # Errors
    ///
    /// Propagates refusals of the sweep and failures of the backend.
    pub fn save_changes(&mut self) -> Result<usize, StoreError> {
        let mut changes = self.pending.clone();
        for change in changes.iter_mut().filter(|c| c.is_write()) {
            self.sweeper.encrypt_sensitive_fields(&mut change.record)?;
        }

        let written = self.inner.save_changes(changes)?;
        debug!(entity = T::KIND, written, "saved pending changes");
        self.pending.clear();
        Ok(written)
    }

    /// Find a record by key, decrypted for the current caller.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn find(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(mut record) = self.inner.find(key)? else {
            return Ok(None);
        };
        self.open(&mut record);
        Ok(Some(record))
    }

    /// All records, each decrypted for the current caller.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let mut records = self.inner.find_all()?;
        for record in &mut records {
            self.open(record);
        }
        Ok(records)
    }

    fn open(&self, record: &mut T) {
        self.sweeper.restore_seal(record);
        if let Some(caller) = self.callers.current_caller() {
            self.sweeper.decrypt_sensitive_fields(record, &caller);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{looks_encrypted, CipherKey, FieldCipher};
    use crate::models::{standard_registry, Patient};
    use crate::policy::{Caller, DecryptionPolicy, ACCESS_DENIED};
    use crate::protector::DataProtector;
    use crate::store::{MockPersistence, NoCaller};

    fn sweeper() -> FieldSweeper {
        let key = CipherKey::from_secret("hook-test-secret").unwrap();
        let protector = DataProtector::new(FieldCipher::new(key), DecryptionPolicy::default());
        FieldSweeper::new(Arc::new(protector), Arc::new(standard_registry()))
    }

    fn nurse() -> Arc<dyn CallerAccessor> {
        Arc::new(Caller::authenticated("nurse.joy", ["Nurse"].into_iter().collect()))
    }

    fn patient(id: &str) -> Patient {
        Patient {
            id: id.into(),
            full_name: Some("Maria Santos".into()),
            address: Some("Baesa, Quezon City".into()),
            room: Some("B-2".into()),
            ..Default::default()
        }
    }

    fn sealed(s: &FieldSweeper, id: &str) -> Patient {
        let mut p = patient(id);
        s.encrypt_sensitive_fields(&mut p).unwrap();
        p
    }

    #[test]
    fn save_encrypts_creates_and_updates_only() {
        let mut mock = MockPersistence::<Patient>::new();
        mock.expect_save_changes()
            .withf(|changes| {
                changes.len() == 2
                    && changes[0].record.full_name.is_none()
                    && changes[0]
                        .record
                        .encrypted_full_name
                        .as_deref()
                        .is_some_and(looks_encrypted)
                    && changes[1].state == EntryState::Deleted
                    && changes[1].record.full_name.as_deref() == Some("Maria Santos")
            })
            .times(1)
            .returning(|changes| Ok(changes.len()));

        let mut ctx = EncryptedContext::new(mock, sweeper(), nurse());
        ctx.add(patient("p-1")).unwrap();
        ctx.remove(patient("p-2"));
        assert_eq!(ctx.save_changes().unwrap(), 2);
        assert_eq!(ctx.pending(), 0);
    }

    #[test]
    fn backend_failure_keeps_queue() {
        let mut mock = MockPersistence::<Patient>::new();
        mock.expect_save_changes()
            .times(1)
            .returning(|_| Err(StoreError::Backend("disk full".into())));

        let mut ctx = EncryptedContext::new(mock, sweeper(), nurse());
        ctx.add(patient("p-1")).unwrap();
        assert!(ctx.save_changes().is_err());
        assert_eq!(ctx.pending(), 1);
    }

    #[test]
    fn find_decrypts_for_authorized_caller() {
        let s = sweeper();
        let stored = sealed(&s, "p-1");
        let mut mock = MockPersistence::<Patient>::new();
        mock.expect_find()
            .withf(|key| key == "p-1")
            .returning(move |_| Ok(Some(stored.clone())));

        let ctx = EncryptedContext::new(mock, s, nurse());
        let found = ctx.find("p-1").unwrap().unwrap();
        assert_eq!(found.full_name.as_deref(), Some("Maria Santos"));
        assert_eq!(found.address.as_deref(), Some("Baesa, Quezon City"));
        assert_eq!(found.room.as_deref(), Some("B-2"));
    }

    #[test]
    fn find_missing_returns_none() {
        let mut mock = MockPersistence::<Patient>::new();
        mock.expect_find().returning(|_| Ok(None));
        let ctx = EncryptedContext::new(mock, sweeper(), nurse());
        assert!(ctx.find("nope").unwrap().is_none());
    }

    #[test]
    fn find_without_caller_stays_sealed() {
        let s = sweeper();
        let stored = sealed(&s, "p-1");
        let mut mock = MockPersistence::<Patient>::new();
        mock.expect_find().returning(move |_| Ok(Some(stored.clone())));

        let ctx = EncryptedContext::new(mock, s, Arc::new(NoCaller));
        let found = ctx.find("p-1").unwrap().unwrap();
        assert!(found.full_name.is_none());
        assert!(found.seal().is_sealed("full_name"));
        assert!(!found.seal().is_redacted());
    }

    #[test]
    fn find_all_redacts_for_anonymous_and_refuses_write_back() {
        let s = sweeper();
        let stored = vec![sealed(&s, "p-1"), sealed(&s, "p-2")];
        let mut mock = MockPersistence::<Patient>::new();
        mock.expect_find_all().returning(move || Ok(stored.clone()));
        mock.expect_save_changes().never();

        let mut ctx = EncryptedContext::new(mock, s, Arc::new(Caller::Anonymous));
        let all = ctx.find_all().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all
            .iter()
            .all(|p| p.full_name.as_deref() == Some(ACCESS_DENIED)));

        let err = ctx.update(all[0].clone()).unwrap_err();
        assert_eq!(err, StoreError::Redacted { kind: "patients" });
    }
}
