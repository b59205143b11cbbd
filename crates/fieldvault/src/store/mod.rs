//! Persistence interception.
//!
//! [`Persistence`] is the seam to the underlying store. [`EncryptedContext`]
//! wraps one and runs the field sweep around it: pending creates and updates
//! are encrypted before they are handed to the store, and records coming back
//! from `find`/`find_all` are decrypted for the ambient caller supplied by a
//! [`CallerAccessor`]. [`InMemoryStore`] is a reference backend.

pub mod hook;
pub mod memory;

pub use hook::EncryptedContext;
pub use memory::InMemoryStore;

use thiserror::Error;

use crate::policy::Caller;
use crate::registry::Record;
use crate::sweep::SweepError;

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} record {key:?} not found")]
    NotFound { kind: &'static str, key: String },

    #[error("{kind} record {key:?} already exists")]
    Conflict { kind: &'static str, key: String },

    /// A record holding access-denied sentinels was submitted for saving.
    #[error("{kind} record was redacted for an unauthorized caller and cannot be saved")]
    Redacted { kind: &'static str },

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<SweepError> for StoreError {
    fn from(e: SweepError) -> Self {
        match e {
            SweepError::Redacted { kind } => StoreError::Redacted { kind },
        }
    }
}

/// What a pending change does to its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Added,
    Modified,
    Unchanged,
    Deleted,
}

/// One pending change in a unit of work.
#[derive(Debug, Clone)]
pub struct Change<T> {
    pub state: EntryState,
    pub record: T,
}

impl<T> Change<T> {
    pub fn new(state: EntryState, record: T) -> Self {
        Self { state, record }
    }

    /// Whether the sweep must encrypt this change before it is stored.
    pub fn is_write(&self) -> bool {
        matches!(self.state, EntryState::Added | EntryState::Modified)
    }
}

/// Underlying storage for records of type `T`.
///
/// Implementations store records exactly as given; encryption happens before
/// a record reaches them.
#[cfg_attr(test, mockall::automock)]
pub trait Persistence<T: Record>: Send + Sync {
    /// Apply `changes` as one unit. Returns the number of records written or
    /// deleted.
    fn save_changes(&self, changes: Vec<Change<T>>) -> Result<usize, StoreError>;

    fn find(&self, key: &str) -> Result<Option<T>, StoreError>;

    fn find_all(&self) -> Result<Vec<T>, StoreError>;
}

/// Supplies the caller of the current request, if there is one.
pub trait CallerAccessor: Send + Sync {
    fn current_caller(&self) -> Option<Caller>;
}

impl CallerAccessor for Caller {
    fn current_caller(&self) -> Option<Caller> {
        Some(self.clone())
    }
}

impl CallerAccessor for Option<Caller> {
    fn current_caller(&self) -> Option<Caller> {
        self.clone()
    }
}

/// No ambient request context, e.g. a background job. Records are returned
/// with their stored ciphertext.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCaller;

impl CallerAccessor for NoCaller {
    fn current_caller(&self) -> Option<Caller> {
        None
    }
}
