//! [`SealState`]: which sensitive fields of one record instance hold ciphertext.

use std::collections::BTreeMap;

/// Per-instance encryption bookkeeping.
///
/// Each sealed field remembers the exact stored value it was sealed with. The
/// save sweep skips a field only while it still holds that value, so a record
/// saved twice is never double-encrypted and a replaced value is always
/// encrypted, whatever it looks like. It is runtime state only and is never
/// serialised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SealState {
    sealed: BTreeMap<&'static str, String>,
    redacted: bool,
}

impl SealState {
    /// Whether `field` currently holds ciphertext.
    pub fn is_sealed(&self, field: &str) -> bool {
        self.sealed.contains_key(field)
    }

    /// The stored value `field` was sealed with, if it is sealed.
    pub fn sealed_value(&self, field: &str) -> Option<&str> {
        self.sealed.get(field).map(String::as_str)
    }

    /// Whether `field` is sealed and still holds exactly `value`.
    pub fn holds_sealed(&self, field: &str, value: &str) -> bool {
        self.sealed_value(field) == Some(value)
    }

    /// Number of fields currently holding ciphertext.
    pub fn sealed_count(&self) -> usize {
        self.sealed.len()
    }

    /// Whether sensitive values were replaced with the access-denied sentinel.
    ///
    /// A redacted record must not be written back.
    pub fn is_redacted(&self) -> bool {
        self.redacted
    }

    pub(crate) fn mark_sealed(&mut self, field: &'static str, stored: String) {
        self.sealed.insert(field, stored);
    }

    pub(crate) fn mark_open(&mut self, field: &'static str) {
        self.sealed.remove(field);
    }

    pub(crate) fn mark_redacted(&mut self) {
        self.redacted = true;
    }
}
