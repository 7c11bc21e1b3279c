use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use super::domain::{AttributeKind, EmployeeRecord, ReferenceEntry};
use super::normalizer::normalize_name;

/// Name → id lookup table built once per roster load.
///
/// The first occurrence of a name wins, matching what a linear roster scan would return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceIndex {
    entries: BTreeMap<(AttributeKind, String), u64>,
}

impl ReferenceIndex {
    pub fn from_records(records: &[EmployeeRecord]) -> Self {
        let mut index = Self::default();
        for record in records {
            for kind in AttributeKind::RESOLUTION_ORDER {
                let name = record.attribute_name(kind);
                let id = record.attribute_id(kind);
                if let (Some(name), Some(id)) = (name, id) {
                    index.insert(kind, name, id);
                }
            }
        }
        index
    }

    /// Returns `false` when the name is blank or already indexed for this kind.
    pub fn insert(&mut self, kind: AttributeKind, name: &str, id: u64) -> bool {
        let key = normalize_name(name);
        if key.is_empty() || id == 0 {
            return false;
        }
        match self.entries.entry((kind, key)) {
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn lookup(&self, kind: AttributeKind, name: &str) -> Option<u64> {
        self.entries.get(&(kind, normalize_name(name))).copied()
    }

    /// Normalized keys and ids indexed under `kind`.
    pub fn entries_of(&self, kind: AttributeKind) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries
            .iter()
            .filter(move |((entry_kind, _), _)| *entry_kind == kind)
            .map(|((_, name), id)| (name.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable roster view shared by matchers, sessions, and HTTP handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSnapshot {
    records: Vec<EmployeeRecord>,
    index: ReferenceIndex,
}

impl RosterSnapshot {
    pub fn new(records: Vec<EmployeeRecord>) -> Self {
        let index = ReferenceIndex::from_records(&records);
        Self { records, index }
    }

    pub fn with_reference_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = ReferenceEntry>,
    {
        for entry in entries {
            self.index.insert(entry.kind, &entry.name, entry.id);
        }
        self
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> RosterSummary {
        let vacancies = self.records.iter().filter(|record| record.is_vacancy).count();
        RosterSummary {
            records: self.records.len(),
            employees: self.records.len() - vacancies,
            vacancies,
            indexed_names: self.index.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RosterSummary {
    pub records: usize,
    pub employees: usize,
    pub vacancies: usize,
    pub indexed_names: usize,
}

/// Swappable holder for the current roster snapshot.
///
/// Readers take a cheap `Arc` clone; a reload replaces the snapshot wholesale.
#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    current: Arc<RwLock<Arc<RosterSnapshot>>>,
}

impl RosterStore {
    pub fn new(snapshot: RosterSnapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    pub fn current(&self) -> Arc<RosterSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, snapshot: RosterSnapshot) -> Arc<RosterSnapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = snapshot.clone();
        snapshot
    }
}
