use crate::collection::{Collection, CollectionConfig, Document};
use crate::common::stream::JoinSource;
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::store::StorageAdapter;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use itertools::Itertools;
use std::ops::Deref;
use std::sync::{Arc, Weak};

#[derive(Clone)]
pub(crate) struct CollectionFactory {
    inner: Arc<CollectionFactoryInner>,
}

impl CollectionFactory {
    pub fn new(config: CollectionConfig, storage: Arc<dyn StorageAdapter>) -> Self {
        CollectionFactory {
            inner: Arc::new_cyclic(|me| CollectionFactoryInner {
                me: me.clone(),
                collection_map: DashMap::new(),
                config,
                storage,
            }),
        }
    }
}

impl Deref for CollectionFactory {
    type Target = Arc<CollectionFactoryInner>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Registry of open collections. Each name is loaded from storage at most
/// once; later lookups share the same [Collection].
pub(crate) struct CollectionFactoryInner {
    me: Weak<CollectionFactoryInner>,
    collection_map: DashMap<String, Collection>,
    config: CollectionConfig,
    storage: Arc<dyn StorageAdapter>,
}

impl CollectionFactoryInner {
    pub fn get_collection(&self, name: &str) -> DocStoreResult<Collection> {
        validate_collection_name(name)?;

        if let Some(collection) = self.collection_map.get(name) {
            return Ok(collection.clone());
        }

        match self.collection_map.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let join_source: Weak<dyn JoinSource> = self.me.clone();
                let collection =
                    Collection::open(name, self.config.clone(), self.storage.clone(), join_source)?;
                entry.insert(collection.clone());
                Ok(collection)
            }
        }
    }

    /// True if the collection is open or storage holds it.
    pub fn has_collection(&self, name: &str) -> bool {
        self.collection_map.contains_key(name) || self.storage.exists(name)
    }

    /// Names of open and stored collections, sorted and without duplicates.
    pub fn list_collection_names(&self) -> DocStoreResult<Vec<String>> {
        let stored = self.storage.collection_names()?;
        let open: Vec<String> = self
            .collection_map
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        Ok(stored.into_iter().chain(open).sorted().dedup().collect())
    }

    pub fn has_unsaved_changes(&self) -> DocStoreResult<bool> {
        for collection in self.collections() {
            if collection.has_unsaved_changes()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Syncs every open collection, stopping at the first failure.
    pub fn commit(&self) -> DocStoreResult<()> {
        for collection in self.collections() {
            collection.sync()?;
        }
        Ok(())
    }

    /// Closes every open collection and forgets it.
    pub fn clear(&self) {
        for collection in self.collections() {
            collection.close();
        }
        self.collection_map.clear();
    }

    // snapshot of the handles so no map guard is held while collections lock
    fn collections(&self) -> Vec<Collection> {
        self.collection_map
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl JoinSource for CollectionFactoryInner {
    fn join_documents(&self, collection: &str) -> DocStoreResult<Option<Vec<Document>>> {
        if validate_collection_name(collection).is_err() {
            return Ok(None);
        }

        let open = self
            .collection_map
            .get(collection)
            .map(|entry| entry.value().clone());
        match open {
            Some(target) => Ok(Some(target.snapshot())),
            None if self.storage.exists(collection) => {
                let target = self.get_collection(collection)?;
                Ok(Some(target.snapshot()))
            }
            None => Ok(None),
        }
    }
}

/// Collection names become file names, so they must be non-empty and free of
/// path separators.
pub(crate) fn validate_collection_name(name: &str) -> DocStoreResult<()> {
    if name.is_empty() {
        log::error!("Collection name cannot be empty");
        return Err(DocStoreError::new(
            "Collection name cannot be empty",
            ErrorKind::InvalidOperation,
        ));
    }

    if name.contains(['/', '\\']) || name == "." || name == ".." {
        log::error!("Invalid collection name {}", name);
        return Err(DocStoreError::new(
            &format!("Invalid collection name {}", name),
            ErrorKind::InvalidOperation,
        ));
    }
    Ok(())
}
