use crate::collection::operation::{CollectionState, ReadOperations, WriteOperations};
use crate::collection::{CollectionConfig, Document, DocumentId, ModifierSet, QueryOptions};
use crate::common::stream::{prepare_joins, present, JoinSource};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::filter::Query;
use crate::store::{DocumentMap, StorageAdapter};
use parking_lot::RwLock;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// A named, ordered set of documents.
///
/// `Collection` is a cheap handle: clones share the same documents. Queries,
/// updates and removes take their query as a [Document] in the predicate
/// language and their modifiers as a document of `$inc`, `$set`, `$unset`,
/// `$push` and `$merge` entries. Every returned document is a copy; changing
/// it does not change the collection.
///
/// # Examples
///
/// ```rust
/// use docstore::database::Database;
/// use docstore::doc;
///
/// let db = Database::builder().open_or_create().unwrap();
/// let planets = db.collection("planets").unwrap();
/// planets.insert(doc! { name: "Venus", temp: { avg: 475 } }).unwrap();
///
/// let hot = planets.find(&doc! { avg: { "$gt": 400 } }).unwrap();
/// assert_eq!(hot.len(), 1);
///
/// planets.update(&doc! { name: "Venus" }, &doc! { "$inc": { avg: 1 } }).unwrap();
/// ```
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

struct CollectionInner {
    name: String,
    config: CollectionConfig,
    read_operations: ReadOperations,
    write_operations: WriteOperations,
    join_source: Weak<dyn JoinSource>,
    closed: AtomicBool,
}

impl Collection {
    /// Loads the named collection from storage.
    pub(crate) fn open(
        name: &str,
        config: CollectionConfig,
        storage: Arc<dyn StorageAdapter>,
        join_source: Weak<dyn JoinSource>,
    ) -> DocStoreResult<Collection> {
        let loaded = storage.load(name)?;
        let documents = rekey(name, loaded, config.reserved_keys().id())?;
        log::debug!("Opened collection '{}' with {} documents", name, documents.len());

        let state = Arc::new(RwLock::new(CollectionState::new(documents)));
        let read_operations = ReadOperations::new(name.to_string(), config.clone(), state.clone());
        let write_operations = WriteOperations::new(name.to_string(), config.clone(), state, storage);

        Ok(Collection {
            inner: Arc::new(CollectionInner {
                name: name.to_string(),
                config,
                read_operations,
                write_operations,
                join_source,
                closed: AtomicBool::new(false),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Inserts a document and returns its stored form, carrying a fresh
    /// identifier and both timestamps.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the document already has an identifier.
    pub fn insert(&self, document: Document) -> DocStoreResult<Document> {
        let mut inserted = self.insert_many(vec![document])?;
        inserted.pop().ok_or_else(|| {
            log::error!("Insert into '{}' returned no document", self.inner.name);
            DocStoreError::new("Insert returned no document", ErrorKind::InternalError)
        })
    }

    /// Inserts several documents at once. Either all are stored or none are.
    pub fn insert_many(&self, documents: Vec<Document>) -> DocStoreResult<Vec<Document>> {
        self.ensure_opened()?;
        self.inner.write_operations.insert(documents)
    }

    /// Returns every document matching `query`, in collection order.
    pub fn find(&self, query: &Document) -> DocStoreResult<Vec<Document>> {
        self.find_with_options(query, &QueryOptions::default())
    }

    /// Returns the matches of `query` joined, sorted, windowed and projected
    /// per `options`.
    pub fn find_with_options(
        &self,
        query: &Document,
        options: &QueryOptions,
    ) -> DocStoreResult<Vec<Document>> {
        self.ensure_opened()?;
        let query = Query::parse(query)?;
        let source = self.join_source(options)?;
        self.inner
            .read_operations
            .find(&query, options, source.as_deref())
    }

    /// Returns the first match of `query`, if any.
    pub fn find_one(&self, query: &Document) -> DocStoreResult<Option<Document>> {
        let found = self.find_with_options(query, &QueryOptions::new().take(1))?;
        Ok(found.into_iter().next())
    }

    pub fn update(&self, query: &Document, modifiers: &Document) -> DocStoreResult<Vec<Document>> {
        self.update_with_options(query, modifiers, &QueryOptions::default())
    }

    /// Applies `modifiers` to the matches of `query` and returns the updated
    /// documents.
    ///
    /// Sort, skip and take in `options` choose which matches are updated;
    /// joins and projection shape only the returned documents. The stored
    /// identifier and creation time never change, and the update time is
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Fails without changing anything if the query, modifiers or joins are
    /// malformed, if a join target cannot be loaded, or if any selected
    /// document cannot be updated.
    pub fn update_with_options(
        &self,
        query: &Document,
        modifiers: &Document,
        options: &QueryOptions,
    ) -> DocStoreResult<Vec<Document>> {
        self.ensure_opened()?;
        let query = Query::parse(query)?;
        let modifiers = ModifierSet::parse(modifiers)?;
        let source = self.join_source(options)?;
        prepare_joins(options.joins(), source.as_deref())?;

        let updated = self
            .inner
            .write_operations
            .update(&query, &modifiers, options)?;
        present(updated, options, source.as_deref(), self.id_key())
    }

    pub fn remove(&self, query: &Document) -> DocStoreResult<Vec<Document>> {
        self.remove_with_options(query, &QueryOptions::default())
    }

    /// Removes the matches of `query` selected by `options` and returns them
    /// as they were before removal.
    pub fn remove_with_options(
        &self,
        query: &Document,
        options: &QueryOptions,
    ) -> DocStoreResult<Vec<Document>> {
        self.ensure_opened()?;
        let query = Query::parse(query)?;
        let source = self.join_source(options)?;
        prepare_joins(options.joins(), source.as_deref())?;

        let removed = self.inner.write_operations.remove(&query, options)?;
        present(removed, options, source.as_deref(), self.id_key())
    }

    pub fn get_by_id(&self, id: &DocumentId) -> DocStoreResult<Option<Document>> {
        self.ensure_opened()?;
        Ok(self.inner.read_operations.get_by_id(id))
    }

    pub fn size(&self) -> DocStoreResult<usize> {
        self.ensure_opened()?;
        Ok(self.inner.read_operations.size())
    }

    /// Writes pending changes to storage. A no-op when nothing changed.
    pub fn sync(&self) -> DocStoreResult<()> {
        self.ensure_opened()?;
        self.inner.write_operations.sync()
    }

    pub fn has_unsaved_changes(&self) -> DocStoreResult<bool> {
        self.ensure_opened()?;
        Ok(self.inner.read_operations.has_unsaved_changes())
    }

    pub fn is_open(&self) -> bool {
        !self.inner.closed.load(Ordering::Relaxed)
    }

    pub(crate) fn snapshot(&self) -> Vec<Document> {
        self.inner.read_operations.snapshot()
    }

    pub(crate) fn close(&self) {
        self.inner.closed.store(true, Ordering::Relaxed);
    }

    fn id_key(&self) -> &str {
        self.inner.config.reserved_keys().id()
    }

    fn join_source(&self, options: &QueryOptions) -> DocStoreResult<Option<Arc<dyn JoinSource>>> {
        if options.joins().is_empty() {
            return Ok(None);
        }
        match self.inner.join_source.upgrade() {
            Some(source) => Ok(Some(source)),
            None => {
                log::error!(
                    "Collection '{}' cannot join, its database is gone",
                    self.inner.name
                );
                Err(DocStoreError::new(
                    "Joins need an open database",
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }

    fn ensure_opened(&self) -> DocStoreResult<()> {
        if self.inner.closed.load(Ordering::Relaxed) {
            log::error!("Collection '{}' is closed", self.inner.name);
            return Err(DocStoreError::new(
                &format!("Collection '{}' is closed", self.inner.name),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}

impl Debug for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .finish()
    }
}

/// Keys loaded documents by their stored identifier, falling back to the
/// storage key, and makes sure each document carries its identifier.
/// Two documents resolving to the same identifier fail the load.
fn rekey(name: &str, loaded: DocumentMap, id_key: &str) -> DocStoreResult<DocumentMap> {
    let mut documents = DocumentMap::with_capacity(loaded.len());
    for (key, mut document) in loaded {
        let id = document
            .get(id_key)
            .and_then(|value| DocumentId::from_value(value).ok())
            .unwrap_or(key);
        if documents.contains_key(&id) {
            log::error!("Collection '{}' stores id {} more than once", name, id);
            return Err(DocStoreError::new(
                &format!("Collection '{}' stores id {} more than once", name, id),
                ErrorKind::StorageError,
            ));
        }
        if !document.contains_key(id_key) {
            document.put(id_key, &id)?;
        }
        documents.insert(id, document);
    }
    Ok(documents)
}
