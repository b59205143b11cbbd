//! Sensitive-field registry: which fields of which record types are encrypted.
//!
//! Each record type declares an ordered [`FieldSet`] of [`SensitiveField`]s:
//! plain getter/setter function pairs over text values, tagged with how the
//! ciphertext is stored ([`FieldStorage`]). The [`FieldRegistry`] collects these
//! once at startup, keyed by [`Record::KIND`], so the complete list of encrypted
//! columns is auditable in one place.
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** This module never touches keys or ciphertext;
//!   it only describes where sensitive values live.

pub mod seal;

pub use seal::SealState;

use std::any::Any;
use std::collections::HashMap;

/// Reads a sensitive value as text. `None` means "no value".
pub type Getter<T> = fn(&T) -> Option<String>;

/// Writes a sensitive value back from text.
pub type Setter<T> = fn(&mut T, Option<String>);

/// A getter/setter pair for one text-valued slot on `T`.
pub struct Accessor<T> {
    pub get: Getter<T>,
    pub set: Setter<T>,
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Accessor<T> {}

/// Where a field's ciphertext is kept.
pub enum FieldStorage<T> {
    /// The ciphertext replaces the value in the same field.
    Overwrite,
    /// The ciphertext is written to a separate `column`; the named field holds
    /// plaintext in memory only and is cleared when the record is sealed.
    Shadow {
        column: &'static str,
        accessor: Accessor<T>,
    },
}

/// One sensitive field of a record type.
pub struct SensitiveField<T> {
    name: &'static str,
    accessor: Accessor<T>,
    storage: FieldStorage<T>,
}

impl<T> SensitiveField<T> {
    /// A field whose ciphertext overwrites its own value.
    pub fn overwrite(name: &'static str, get: Getter<T>, set: Setter<T>) -> Self {
        Self {
            name,
            accessor: Accessor { get, set },
            storage: FieldStorage::Overwrite,
        }
    }

    /// A field whose ciphertext lives in the shadow `column`.
    pub fn shadow(
        name: &'static str,
        get: Getter<T>,
        set: Setter<T>,
        column: &'static str,
        column_get: Getter<T>,
        column_set: Setter<T>,
    ) -> Self {
        Self {
            name,
            accessor: Accessor { get, set },
            storage: FieldStorage::Shadow {
                column,
                accessor: Accessor {
                    get: column_get,
                    set: column_set,
                },
            },
        }
    }

    /// Field name as seen by application code.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name of the field that is actually persisted.
    pub fn column(&self) -> &'static str {
        match &self.storage {
            FieldStorage::Overwrite => self.name,
            FieldStorage::Shadow { column, .. } => *column,
        }
    }

    pub fn storage(&self) -> &FieldStorage<T> {
        &self.storage
    }

    pub fn accessor(&self) -> Accessor<T> {
        self.accessor
    }
}

/// Ordered list of the sensitive fields of one record type.
pub struct FieldSet<T> {
    fields: Vec<SensitiveField<T>>,
}

impl<T> FieldSet<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field.
    pub fn with(mut self, field: SensitiveField<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by its application-facing name.
    pub fn get(&self, name: &str) -> Option<&SensitiveField<T>> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SensitiveField<T>> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Application-facing names of the fields, in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(SensitiveField::name)
    }
}

impl<T> Default for FieldSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<SensitiveField<T>> for FieldSet<T> {
    fn from_iter<I: IntoIterator<Item = SensitiveField<T>>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A persisted record type with sensitive fields.
pub trait Record: Clone + Send + Sync + 'static {
    /// Stable identifier of the record type, e.g. `"patients"`.
    const KIND: &'static str;

    /// Primary key.
    fn key(&self) -> &str;

    fn set_key(&mut self, key: String);

    /// Encryption bookkeeping of this instance.
    fn seal(&self) -> &SealState;

    fn seal_mut(&mut self) -> &mut SealState;

    /// The type's sensitive fields, in sweep order.
    fn sensitive_fields() -> FieldSet<Self>;
}

/// Registry of sensitive-field lists keyed by record kind.
///
/// Built once at startup and shared read-only.
pub struct FieldRegistry {
    sets: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl FieldRegistry {
    pub fn builder() -> FieldRegistryBuilder {
        FieldRegistryBuilder {
            sets: HashMap::new(),
        }
    }

    /// Look up the field list of `T`.
    ///
    /// Returns `None` for record types that were never registered; those have
    /// no sensitive fields as far as the sweep is concerned.
    pub fn fields<T: Record>(&self) -> Option<&FieldSet<T>> {
        self.sets
            .get(T::KIND)
            .and_then(|set| set.downcast_ref::<FieldSet<T>>())
    }

    /// Registered record kinds, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.sets.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl std::fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Builder for [`FieldRegistry`].
pub struct FieldRegistryBuilder {
    sets: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl FieldRegistryBuilder {
    /// Register `T` with its declared [`Record::sensitive_fields`].
    pub fn register<T: Record>(self) -> Self {
        self.register_with::<T>(T::sensitive_fields())
    }

    /// Register `T` with an explicit field list, replacing any earlier entry.
    pub fn register_with<T: Record>(mut self, fields: FieldSet<T>) -> Self {
        self.sets.insert(T::KIND, Box::new(fields));
        self
    }

    pub fn build(self) -> FieldRegistry {
        FieldRegistry { sets: self.sets }
    }
}

/// Declare an [`SensitiveField::overwrite`] over an `Option<String>` field.
///
/// `overwrite!(Type, field)` names the entry after the field;
/// `overwrite!(Type, "name", nested.path)` reaches into nested structs.
macro_rules! overwrite {
    ($ty:ty, $field:ident) => {
        $crate::registry::overwrite!($ty, stringify!($field), $field)
    };
    ($ty:ty, $name:expr, $($path:ident).+) => {
        $crate::registry::SensitiveField::<$ty>::overwrite(
            $name,
            |r: &$ty| r.$($path).+.clone(),
            |r: &mut $ty, v: Option<String>| r.$($path).+ = v,
        )
    };
}

/// Declare a [`SensitiveField::shadow`] between two `Option<String>` fields.
///
/// `shadow!(Type, plain => column)`.
macro_rules! shadow {
    ($ty:ty, $field:ident => $column:ident) => {
        $crate::registry::SensitiveField::<$ty>::shadow(
            stringify!($field),
            |r: &$ty| r.$field.clone(),
            |r: &mut $ty, v: Option<String>| r.$field = v,
            stringify!($column),
            |r: &$ty| r.$column.clone(),
            |r: &mut $ty, v: Option<String>| r.$column = v,
        )
    };
}

pub(crate) use {overwrite, shadow};

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Note {
        id: String,
        body: Option<String>,
        seal: SealState,
    }

    impl Record for Note {
        const KIND: &'static str = "notes";

        fn key(&self) -> &str {
            &self.id
        }
        fn set_key(&mut self, key: String) {
            self.id = key;
        }
        fn seal(&self) -> &SealState {
            &self.seal
        }
        fn seal_mut(&mut self) -> &mut SealState {
            &mut self.seal
        }
        fn sensitive_fields() -> FieldSet<Self> {
            FieldSet::new().with(overwrite!(Note, body))
        }
    }

    #[derive(Clone, Default)]
    struct Unregistered {
        id: String,
        seal: SealState,
    }

    impl Record for Unregistered {
        const KIND: &'static str = "unregistered";

        fn key(&self) -> &str {
            &self.id
        }
        fn set_key(&mut self, key: String) {
            self.id = key;
        }
        fn seal(&self) -> &SealState {
            &self.seal
        }
        fn seal_mut(&mut self) -> &mut SealState {
            &mut self.seal
        }
        fn sensitive_fields() -> FieldSet<Self> {
            FieldSet::new()
        }
    }

    #[test]
    fn registered_type_resolves() {
        let registry = FieldRegistry::builder().register::<Note>().build();
        let set = registry.fields::<Note>().unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["body"]);
        assert_eq!(registry.kinds(), vec!["notes"]);
    }

    #[test]
    fn unregistered_type_has_no_fields() {
        let registry = FieldRegistry::builder().register::<Note>().build();
        assert!(registry.fields::<Unregistered>().is_none());
    }

    #[test]
    fn accessor_reads_and_writes() {
        let set = Note::sensitive_fields();
        let field = set.iter().next().unwrap();
        let mut note = Note::default();
        (field.accessor().set)(&mut note, Some("hello".into()));
        assert_eq!((field.accessor().get)(&note).as_deref(), Some("hello"));
        assert_eq!(field.column(), "body");
        assert!(matches!(field.storage(), FieldStorage::Overwrite));
    }

    #[test]
    fn register_with_replaces_declared_list() {
        let registry = FieldRegistry::builder()
            .register::<Note>()
            .register_with::<Note>(FieldSet::new())
            .build();
        assert!(registry.fields::<Note>().unwrap().is_empty());
    }
}
