use crate::store::{DocumentMap, StorageAdapter};
use crate::errors::DocStoreResult;
use dashmap::DashMap;

/// Storage that keeps the last persisted snapshot of each collection in
/// memory. Used when a database is opened without a directory.
#[derive(Default)]
pub struct MemoryStorage {
    snapshots: DashMap<String, DocumentMap>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }
}

impl StorageAdapter for MemoryStorage {
    fn load(&self, collection: &str) -> DocStoreResult<DocumentMap> {
        Ok(self
            .snapshots
            .get(collection)
            .map(|snapshot| snapshot.value().clone())
            .unwrap_or_default())
    }

    fn persist(&self, collection: &str, documents: &DocumentMap) -> DocStoreResult<()> {
        self.snapshots.insert(collection.to_string(), documents.clone());
        Ok(())
    }

    fn exists(&self, collection: &str) -> bool {
        self.snapshots.contains_key(collection)
    }

    fn collection_names(&self) -> DocStoreResult<Vec<String>> {
        let mut names: Vec<String> = self.snapshots.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }
}
