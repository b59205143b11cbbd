//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use fieldvault::models::{
    HeeadsssAssessment, ImmunizationRecord, ImmunizationShortcutForm, NcdRiskAssessment, Patient,
    VitalSign,
};
use fieldvault::{Caller, EncryptedContext, FieldSweeper, InMemoryStore, Record};

/// One in-memory store per record kind.
#[derive(Clone, Default)]
pub struct Stores {
    pub patients: InMemoryStore<Patient>,
    pub vital_signs: InMemoryStore<VitalSign>,
    pub immunization_records: InMemoryStore<ImmunizationRecord>,
    pub immunization_shortcuts: InMemoryStore<ImmunizationShortcutForm>,
    pub heeadsss_assessments: InMemoryStore<HeeadsssAssessment>,
    pub ncd_assessments: InMemoryStore<NcdRiskAssessment>,
}

/// Resolves the store that holds records of type `T`.
pub trait HasStore<T: Record> {
    fn store(&self) -> &InMemoryStore<T>;
}

macro_rules! has_store {
    ($($ty:ty => $field:ident),+ $(,)?) => {
        $(
            impl HasStore<$ty> for Stores {
                fn store(&self) -> &InMemoryStore<$ty> {
                    &self.$field
                }
            }
        )+
    };
}

has_store! {
    Patient => patients,
    VitalSign => vital_signs,
    ImmunizationRecord => immunization_records,
    ImmunizationShortcutForm => immunization_shortcuts,
    HeeadsssAssessment => heeadsss_assessments,
    NcdRiskAssessment => ncd_assessments,
}

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed) so
/// that Axum can clone the state for each request without copying data.
#[derive(Clone)]
pub struct AppState {
    /// Field sweep over the process key and the record registry.
    pub sweeper: FieldSweeper,
    pub stores: Stores,
    /// Header carrying the authenticated subject.
    pub caller_header_name: Arc<String>,
    /// Header carrying the caller's roles.
    pub roles_header_name: Arc<String>,
}

impl AppState {
    pub fn new(sweeper: FieldSweeper, caller_header_name: String, roles_header_name: String) -> Self {
        Self {
            sweeper,
            stores: Stores::default(),
            caller_header_name: Arc::new(caller_header_name),
            roles_header_name: Arc::new(roles_header_name),
        }
    }

    /// A unit of work over the `T` store, decrypting for `caller`.
    pub fn context<T: Record>(&self, caller: Caller) -> EncryptedContext<T, InMemoryStore<T>>
    where
        Stores: HasStore<T>,
    {
        let store = <Stores as HasStore<T>>::store(&self.stores).clone();
        EncryptedContext::new(store, self.sweeper.clone(), Arc::new(caller))
    }
}

#[cfg(test)]
impl Default for AppState {
    /// State with a fixed test key and empty stores.
    fn default() -> Self {
        use fieldvault::models::standard_registry;
        use fieldvault::{CipherKey, DataProtector, DecryptionPolicy, FieldCipher};

        let key = CipherKey::from_bytes([0x42; fieldvault::crypto::KEY_LEN]);
        let protector = DataProtector::new(FieldCipher::new(key), DecryptionPolicy::default());
        let sweeper = FieldSweeper::new(Arc::new(protector), Arc::new(standard_registry()));
        Self::new(
            sweeper,
            "X-Authenticated-User".into(),
            "X-Authenticated-Roles".into(),
        )
    }
}
