//! Encrypt-on-write and decrypt-on-read over a record's sensitive fields.
//!
//! [`FieldSweeper`] walks the [`FieldSet`](crate::registry::FieldSet) that the
//! registry holds for a record's type and applies the [`DataProtector`] to each
//! field, honouring the field's [`FieldStorage`] convention.
//!
//! Field-level failures never abort a sweep: the field keeps its value and the
//! failure is logged with the entity kind and field name. The only refusal is
//! [`SweepError::Redacted`], raised when a record that was decrypted for an
//! unauthorized caller, or any record carrying the access-denied sentinel in a
//! sensitive field, is about to be written back.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::crypto::looks_encrypted;
use crate::policy::{Caller, ACCESS_DENIED};
use crate::protector::DataProtector;
use crate::registry::{FieldRegistry, FieldStorage, Record, SensitiveField};

/// Entity-level refusals of the save sweep.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SweepError {
    /// The record holds access-denied sentinels instead of its real values.
    #[error("{kind} record was redacted for an unauthorized caller and cannot be saved")]
    Redacted { kind: &'static str },
}

/// Applies encryption and role-gated decryption to registered fields.
#[derive(Clone, Debug)]
pub struct FieldSweeper {
    protector: Arc<DataProtector>,
    registry: Arc<FieldRegistry>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl FieldSweeper {
    pub fn new(protector: Arc<DataProtector>, registry: Arc<FieldRegistry>) -> Self {
        Self {
            protector,
            registry,
        }
    }

    pub fn protector(&self) -> &DataProtector {
        &self.protector
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Encrypt every non-empty sensitive field of `record` that does not
    /// already hold ciphertext. Returns the number of fields encrypted.
    ///
    /// A sealed field is skipped only while it still holds the exact value it
    /// was sealed with, so sweeping twice never double-wraps and a replaced
    /// value is always encrypted. A shadow field's plaintext slot is cleared
    /// once the column holds the ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Redacted`] if the record was redacted or any
    /// sensitive field holds [`ACCESS_DENIED`]. Nothing is modified then.
    pub fn encrypt_sensitive_fields<T: Record>(&self, record: &mut T) -> Result<usize, SweepError> {
        if record.seal().is_redacted() {
            return Err(SweepError::Redacted { kind: T::KIND });
        }
        let Some(fields) = self.registry.fields::<T>() else {
            return Ok(0);
        };
        if let Some(field) = fields
            .iter()
            .find(|f| (f.accessor().get)(record).as_deref() == Some(ACCESS_DENIED))
        {
            warn!(entity = T::KIND, field = field.name(),
                "refusing to encrypt the access-denied sentinel");
            return Err(SweepError::Redacted { kind: T::KIND });
        }

        let mut encrypted = 0;
        for field in fields.iter() {
            if self.encrypt_field(record, field) {
                encrypted += 1;
            }
        }
        debug!(entity = T::KIND, fields = encrypted, "encrypted sensitive fields");
        Ok(encrypted)
    }

    fn encrypt_field<T: Record>(&self, record: &mut T, field: &SensitiveField<T>) -> bool {
        let accessor = field.accessor();
        let value = (accessor.get)(record);

        match field.storage() {
            FieldStorage::Overwrite => {
                let Some(plain) = non_empty(value) else {
                    return false;
                };
                if record.seal().holds_sealed(field.name(), &plain) {
                    return false;
                }
                match self.protector.try_encrypt(&plain) {
                    Ok(token) => {
                        (accessor.set)(record, Some(token.clone()));
                        record.seal_mut().mark_sealed(field.name(), token);
                        true
                    }
                    Err(e) => {
                        error!(entity = T::KIND, field = field.name(), error = %e,
                            "field encryption failed; value stored unchanged");
                        record.seal_mut().mark_open(field.name());
                        false
                    }
                }
            }
            FieldStorage::Shadow { column, accessor: column_accessor } => {
                let Some(plain) = non_empty(value) else {
                    if !record.seal().is_sealed(field.name()) {
                        (column_accessor.set)(record, None);
                    }
                    return false;
                };
                // A value that failed to decrypt sits in both the slot and the column.
                if record.seal().holds_sealed(field.name(), &plain)
                    && (column_accessor.get)(record).as_deref() == Some(plain.as_str())
                {
                    (accessor.set)(record, None);
                    return false;
                }
                match self.protector.try_encrypt(&plain) {
                    Ok(token) => {
                        (column_accessor.set)(record, Some(token.clone()));
                        (accessor.set)(record, None);
                        record.seal_mut().mark_sealed(field.name(), token);
                        true
                    }
                    Err(e) => {
                        error!(entity = T::KIND, field = field.name(), column, error = %e,
                            "field encryption failed; value stored unchanged");
                        (column_accessor.set)(record, Some(plain));
                        record.seal_mut().mark_open(field.name());
                        false
                    }
                }
            }
        }
    }

    /// Decrypt every sensitive field of `record` for `caller`. Returns the
    /// number of fields that were decrypted.
    ///
    /// An unauthorized caller gets [`ACCESS_DENIED`] in every non-empty field
    /// and the record is marked redacted. For an authorized caller, fields
    /// that fail to decrypt read back as their stored value and stay sealed;
    /// stored plaintext is passed through.
    pub fn decrypt_sensitive_fields<T: Record>(&self, record: &mut T, caller: &Caller) -> usize {
        let Some(fields) = self.registry.fields::<T>() else {
            return 0;
        };

        if !self.protector.can_decrypt(caller) {
            let redacted = fields
                .iter()
                .filter(|field| redact_field(record, field))
                .count();
            record.seal_mut().mark_redacted();
            info!(entity = T::KIND, fields = redacted,
                "caller not authorized to decrypt; sensitive fields redacted");
            return 0;
        }

        let mut decrypted = 0;
        for field in fields.iter() {
            if self.decrypt_field(record, field) {
                decrypted += 1;
            }
        }
        debug!(entity = T::KIND, fields = decrypted, "decrypted sensitive fields");
        decrypted
    }

    fn decrypt_field<T: Record>(&self, record: &mut T, field: &SensitiveField<T>) -> bool {
        let accessor = field.accessor();
        let stored = match field.storage() {
            FieldStorage::Overwrite => (accessor.get)(record),
            FieldStorage::Shadow { accessor: column, .. } => (column.get)(record),
        };
        let Some(stored) = non_empty(stored) else {
            return false;
        };

        match self.protector.try_decrypt(&stored) {
            Ok(Some(plain)) => {
                (accessor.set)(record, Some(plain));
                record.seal_mut().mark_open(field.name());
                true
            }
            Ok(None) => {
                if matches!(field.storage(), FieldStorage::Shadow { .. }) {
                    (accessor.set)(record, Some(stored));
                }
                record.seal_mut().mark_open(field.name());
                false
            }
            Err(e) => {
                error!(entity = T::KIND, field = field.name(), error = %e,
                    "field decryption failed; value left unchanged");
                if matches!(field.storage(), FieldStorage::Shadow { .. }) {
                    (accessor.set)(record, Some(stored.clone()));
                }
                record.seal_mut().mark_sealed(field.name(), stored);
                false
            }
        }
    }

    /// Mark the fields of a freshly loaded `record` whose stored value looks
    /// like ciphertext as sealed. Returns the number of sealed fields.
    ///
    /// Used when a record is loaded without a caller to decrypt for, so that
    /// writing it back does not wrap the stored ciphertext again.
    pub fn restore_seal<T: Record>(&self, record: &mut T) -> usize {
        let Some(fields) = self.registry.fields::<T>() else {
            return 0;
        };
        for field in fields.iter() {
            let stored = match field.storage() {
                FieldStorage::Overwrite => (field.accessor().get)(record),
                FieldStorage::Shadow { accessor, .. } => (accessor.get)(record),
            };
            if let Some(stored) = stored.filter(|s| looks_encrypted(s)) {
                record.seal_mut().mark_sealed(field.name(), stored);
            }
        }
        record.seal().sealed_count()
    }
}

fn redact_field<T: Record>(record: &mut T, field: &SensitiveField<T>) -> bool {
    let accessor = field.accessor();
    let stored = match field.storage() {
        FieldStorage::Overwrite => (accessor.get)(record),
        FieldStorage::Shadow { accessor: column, .. } => (column.get)(record),
    };
    if non_empty(stored).is_none() {
        return false;
    }
    (accessor.set)(record, Some(ACCESS_DENIED.to_owned()));
    true
}
