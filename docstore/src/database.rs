use crate::collection::collection_factory::{validate_collection_name, CollectionFactory};
use crate::collection::Collection;
use crate::database_builder::DatabaseBuilder;
use crate::database_config::DatabaseConfig;
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An embedded document database: a set of named collections backed by one
/// storage.
///
/// `Database` is a cheap handle. Clones share the same collections, and
/// pending changes are committed when the last clone is dropped.
///
/// # Examples
///
/// ```rust
/// use docstore::database::Database;
/// use docstore::doc;
///
/// let db = Database::builder().open_or_create().unwrap();
/// let users = db.collection("users").unwrap();
/// users.insert(doc! { name: "ann", purchased: [1, 2] }).unwrap();
///
/// assert!(db.has_collection("users").unwrap());
/// db.close().unwrap();
/// assert!(db.collection("users").is_err());
/// ```
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    pub(crate) fn new(config: DatabaseConfig) -> Self {
        Database {
            inner: Arc::new(DatabaseInner::new(config)),
        }
    }

    /// Opens the named collection, loading it from storage on first use. A
    /// collection that does not exist yet starts empty.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the database is closed or the name is
    /// empty or contains a path separator, and `StorageError` if the stored
    /// collection cannot be read.
    pub fn collection(&self, name: &str) -> DocStoreResult<Collection> {
        self.inner.check_opened()?;
        validate_collection_name(name)?;
        self.inner.collection_factory.get_collection(name)
    }

    /// True if the collection is open or present in storage.
    pub fn has_collection(&self, name: &str) -> DocStoreResult<bool> {
        self.inner.check_opened()?;
        Ok(self.inner.collection_factory.has_collection(name))
    }

    /// Names of every open or stored collection, sorted.
    pub fn list_collection_names(&self) -> DocStoreResult<Vec<String>> {
        self.inner.check_opened()?;
        self.inner.collection_factory.list_collection_names()
    }

    pub fn has_unsaved_changes(&self) -> DocStoreResult<bool> {
        self.inner.check_opened()?;
        self.inner.collection_factory.has_unsaved_changes()
    }

    /// Persists every collection with unsaved changes.
    pub fn commit(&self) -> DocStoreResult<()> {
        self.inner.check_opened()?;
        self.inner.collection_factory.commit()
    }

    /// Commits pending changes and closes every collection. Later calls on
    /// this database or its collections fail with `InvalidOperation`.
    pub fn close(&self) -> DocStoreResult<()> {
        self.commit()?;
        self.inner.close();
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> DatabaseConfig {
        self.inner.config.clone()
    }
}

struct DatabaseInner {
    config: DatabaseConfig,
    collection_factory: CollectionFactory,
    closed: AtomicBool,
}

impl DatabaseInner {
    fn new(config: DatabaseConfig) -> Self {
        let storage = config.initialize();
        let collection_factory = CollectionFactory::new(config.collection_config(), storage);
        DatabaseInner {
            config,
            collection_factory,
            closed: AtomicBool::from(false),
        }
    }

    fn check_opened(&self) -> DocStoreResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Database is closed");
            return Err(DocStoreError::new(
                "Database is closed",
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn close(&self) {
        self.collection_factory.clear();
        self.closed.store(true, Ordering::Relaxed);
    }
}

// Runs when the last clone of the database goes away.
impl Drop for DatabaseInner {
    fn drop(&mut self) {
        if self.closed.load(Ordering::Relaxed) {
            return;
        }
        if let Err(e) = self.collection_factory.commit() {
            log::error!("Failed to commit pending changes on drop: {}", e);
        }
        self.close();
    }
}
