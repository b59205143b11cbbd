//! In-memory [`Persistence`] backend.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{Change, EntryState, Persistence, StoreError};
use crate::registry::Record;

/// Records of one type kept in a shared map, keyed by [`Record::key`].
///
/// Clones share the same map.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    records: Arc<RwLock<HashMap<String, T>>>,
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: Record> InMemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<E>(_: E) -> StoreError {
    StoreError::Backend("record map lock poisoned".into())
}

impl<T: Record> Persistence<T> for InMemoryStore<T> {
    fn save_changes(&self, changes: Vec<Change<T>>) -> Result<usize, StoreError> {
        let mut records = self.records.write().map_err(poisoned)?;

        // Validate the whole unit before touching the map.
        for change in &changes {
            let key = change.record.key();
            let exists = records.contains_key(key);
            match change.state {
                EntryState::Added if exists => {
                    return Err(StoreError::Conflict {
                        kind: T::KIND,
                        key: key.to_owned(),
                    })
                }
                EntryState::Modified | EntryState::Deleted if !exists => {
                    return Err(StoreError::NotFound {
                        kind: T::KIND,
                        key: key.to_owned(),
                    })
                }
                _ => {}
            }
        }

        let mut written = 0;
        for change in changes {
            match change.state {
                EntryState::Added | EntryState::Modified => {
                    records.insert(change.record.key().to_owned(), change.record);
                    written += 1;
                }
                EntryState::Deleted => {
                    records.remove(change.record.key());
                    written += 1;
                }
                EntryState::Unchanged => {}
            }
        }
        Ok(written)
    }

    fn find(&self, key: &str) -> Result<Option<T>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        let mut all: Vec<T> = records.values().cloned().collect();
        all.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImmunizationShortcutForm;

    fn form(id: &str) -> ImmunizationShortcutForm {
        ImmunizationShortcutForm {
            id: id.into(),
            child_name: Some("Liza".into()),
            ..Default::default()
        }
    }

    #[test]
    fn add_find_and_delete() {
        let store = InMemoryStore::new();
        let n = store
            .save_changes(vec![Change::new(EntryState::Added, form("a"))])
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(store.find("a").unwrap().unwrap().child_name.as_deref(), Some("Liza"));

        store
            .save_changes(vec![Change::new(EntryState::Deleted, form("a"))])
            .unwrap();
        assert!(store.find("a").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_add_is_a_conflict_and_nothing_is_written() {
        let store = InMemoryStore::new();
        store
            .save_changes(vec![Change::new(EntryState::Added, form("a"))])
            .unwrap();
        let err = store
            .save_changes(vec![
                Change::new(EntryState::Added, form("b")),
                Change::new(EntryState::Added, form("a")),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                kind: "immunization-shortcuts",
                key: "a".into()
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn modifying_missing_record_is_not_found() {
        let store: InMemoryStore<ImmunizationShortcutForm> = InMemoryStore::new();
        let err = store
            .save_changes(vec![Change::new(EntryState::Modified, form("x"))])
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn find_all_is_sorted_by_key() {
        let store = InMemoryStore::new();
        store
            .save_changes(vec![
                Change::new(EntryState::Added, form("b")),
                Change::new(EntryState::Added, form("a")),
            ])
            .unwrap();
        let keys: Vec<_> = store.find_all().unwrap().into_iter().map(|f| f.id).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn clones_share_records() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store
            .save_changes(vec![Change::new(EntryState::Added, form("a"))])
            .unwrap();
        assert_eq!(other.len(), 1);
    }
}
