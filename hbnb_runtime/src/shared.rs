//! Thread-safe storage handle.
//!
//! One coarse lock guards both the identity map and the artifact, so
//! register/remove/lookup interleavings stay linearizable and no two
//! threads write the file at once. Cross-process access is not
//! coordinated; one process owns the file.

use std::sync::Mutex;

use hbnb_engine::{KindRegistry, Record};

use crate::error::StorageError;
use crate::file_storage::FileStorage;

pub struct SharedStorage {
    inner: Mutex<FileStorage>,
}

impl SharedStorage {
    pub fn new(storage: FileStorage) -> Self {
        Self {
            inner: Mutex::new(storage),
        }
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut FileStorage) -> R) -> R {
        let mut storage = self.inner.lock().expect("Storage lock poisoned");
        f(&mut *storage)
    }

    /// Register and persist under lock.
    pub fn register(&self, record: Record) -> Result<(), StorageError> {
        self.with(|storage| {
            storage.map_mut().register(record);
            storage.save()
        })
    }

    /// Remove and persist under lock. Returns whether the record existed;
    /// nothing is written when it did not.
    pub fn remove(&self, kind: &str, id: &str) -> Result<bool, StorageError> {
        self.with(|storage| {
            if !storage.map_mut().remove(kind, id) {
                return Ok(false);
            }
            storage.save()?;
            Ok(true)
        })
    }

    /// Clone of the live record, if any.
    pub fn lookup(&self, kind: &str, id: &str) -> Option<Record> {
        self.with(|storage| storage.map().lookup(kind, id).cloned())
    }

    pub fn count(&self, kind: &str) -> usize {
        self.with(|storage| storage.map().count(kind))
    }

    pub fn reload(&self, registry: &KindRegistry) -> Result<usize, StorageError> {
        self.with(|storage| storage.reload(registry))
    }

    pub fn into_inner(self) -> FileStorage {
        self.inner.into_inner().expect("Storage lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_registrations_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        let registry = Arc::new(KindRegistry::standard());
        let shared = Arc::new(SharedStorage::new(FileStorage::new(&path)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..10 {
                        let record = Record::new(registry.require("Amenity").unwrap());
                        shared.register(record).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(shared.count("Amenity"), 40);
        let reopened = FileStorage::open(&path, &registry).unwrap();
        assert_eq!(reopened.map().count("Amenity"), 40);
    }

    #[test]
    fn remove_missing_record_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let shared = SharedStorage::new(FileStorage::new(dir.path().join("file.json")));
        assert!(!shared.remove("City", "nope").unwrap());
        assert!(shared.with(|s| s.fingerprint()).unwrap().is_none());
    }

    #[test]
    fn remove_then_lookup_misses() {
        let dir = tempfile::tempdir().unwrap();
        let registry = KindRegistry::standard();
        let shared = SharedStorage::new(FileStorage::new(dir.path().join("file.json")));
        let record = Record::new(registry.require("Review").unwrap());
        let id = record.id().to_string();
        shared.register(record).unwrap();

        assert!(shared.lookup("Review", &id).is_some());
        assert!(shared.remove("Review", &id).unwrap());
        assert!(shared.lookup("Review", &id).is_none());

        let storage = shared.into_inner();
        assert_eq!(storage.map().count("Review"), 0);
    }
}
