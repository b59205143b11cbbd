//! Transparent, role-gated encryption of sensitive record fields.
//!
//! Health-center records (patients, vital signs, immunization records,
//! assessments) carry a handful of fields (names, addresses, birthdates,
//! assessment answers) that must be stored encrypted. This crate intercepts
//! those fields at the persistence boundary:
//!
//! - [`crypto`]: the process key, the AES-256-CBC field cipher and the
//!   "is this already ciphertext" heuristic.
//! - [`policy`]: who may decrypt, and the sentinel shown to everyone else.
//! - [`protector`]: the cipher and policy combined behind one service.
//! - [`registry`]: the per-entity lists of sensitive fields.
//! - [`models`]: the record types and their field lists.
//! - [`sweep`]: encrypt-on-write / decrypt-on-read over a record's fields.
//! - [`store`]: the persistence hook that runs the sweep around save/find.
//!
//! Nothing here holds global state: the key is loaded by the host process and
//! handed to [`crypto::FieldCipher::new`].

pub mod crypto;
pub mod models;
pub mod policy;
pub mod protector;
pub mod registry;
pub mod store;
pub mod sweep;

pub use crypto::{CipherError, CipherKey, FieldCipher, KeyError};
pub use policy::{Caller, DecryptionPolicy, RoleSet, ACCESS_DENIED};
pub use protector::DataProtector;
pub use registry::{FieldRegistry, FieldSet, FieldStorage, Record, SealState, SensitiveField};
pub use store::{
    CallerAccessor, Change, EncryptedContext, EntryState, InMemoryStore, NoCaller, Persistence,
    StoreError,
};
pub use sweep::{FieldSweeper, SweepError};
