/// HBnB Engine: Identity Map
///
/// The single owner of every live record, keyed by `<kind>.<id>`.
/// Listing order is insertion order; overwriting a key keeps its slot.
/// Single-threaded: callers that share it across threads wrap the whole
/// map in one lock.

use std::collections::HashMap;

use crate::record::{Record, RecordKey};

#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    records: HashMap<RecordKey, Record>,
    order: Vec<RecordKey>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under `<kind>.<id>`. Last writer wins.
    pub fn register(&mut self, record: Record) {
        let key = record.key();
        if self.records.insert(key.clone(), record).is_none() {
            self.order.push(key);
        }
    }

    pub fn lookup(&self, kind: &str, id: &str) -> Option<&Record> {
        self.records.get(&RecordKey::new(kind, id))
    }

    pub fn lookup_mut(&mut self, kind: &str, id: &str) -> Option<&mut Record> {
        self.records.get_mut(&RecordKey::new(kind, id))
    }

    /// All records, or only those of `kind`, in insertion order.
    pub fn list(&self, kind: Option<&str>) -> Vec<&Record> {
        self.iter()
            .filter(|r| kind.map_or(true, |k| r.kind() == k))
            .collect()
    }

    /// Returns whether the key existed.
    pub fn remove(&mut self, kind: &str, id: &str) -> bool {
        let key = RecordKey::new(kind, id);
        if self.records.remove(&key).is_none() {
            return false;
        }
        self.order.retain(|k| *k != key);
        true
    }

    pub fn count(&self, kind: &str) -> usize {
        self.records.values().filter(|r| r.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.order.iter().filter_map(|k| self.records.get(k))
    }
}
