//! Configuration management for a docstore database.

use crate::collection::{CollectionConfig, IdStrategy, ReservedKeys};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::store::{JsonFileStorage, MemoryStorage, StorageAdapter};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Settings of a database, shared by every clone of it.
///
/// All settings are fixed once the database is opened; setters called
/// afterwards fail with `InvalidOperation`.
///
/// # Examples
///
/// ```rust
/// use docstore::database_config::DatabaseConfig;
/// use docstore::collection::IdStrategy;
///
/// let config = DatabaseConfig::new();
/// config.set_id_strategy(IdStrategy::Opaque).unwrap();
/// config.set_autosync(false).unwrap();
/// assert!(!config.autosync());
/// assert!(config.directory().is_none());
/// ```
#[derive(Clone)]
pub struct DatabaseConfig {
    inner: Arc<DatabaseConfigInner>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseConfig {
    pub fn new() -> Self {
        DatabaseConfig {
            inner: Arc::new(DatabaseConfigInner::new()),
        }
    }

    /// The directory holding one JSON file per collection, if the database
    /// is file backed.
    pub fn directory(&self) -> Option<PathBuf> {
        self.inner.directory.get().cloned()
    }

    /// Sets the storage directory (can only be set once).
    pub fn set_directory<P: AsRef<Path>>(&self, directory: P) -> DocStoreResult<()> {
        self.inner.ensure_configurable("Storage directory")?;
        let directory = directory.as_ref();
        if directory.as_os_str().is_empty() {
            log::error!("Storage directory cannot be empty");
            return Err(DocStoreError::new(
                "Storage directory cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }
        if self.inner.storage.get().is_some() {
            log::error!("Storage directory cannot be combined with a custom storage adapter");
            return Err(DocStoreError::new(
                "Storage directory cannot be combined with a custom storage adapter",
                ErrorKind::InvalidOperation,
            ));
        }
        self.inner.directory.set(directory.to_path_buf()).map_err(|_| {
            log::error!("Storage directory is already set");
            DocStoreError::new("Storage directory is already set", ErrorKind::InvalidOperation)
        })
    }

    pub fn id_strategy(&self) -> IdStrategy {
        *self.inner.id_strategy.read()
    }

    pub fn set_id_strategy(&self, id_strategy: IdStrategy) -> DocStoreResult<()> {
        self.inner.ensure_configurable("Id strategy")?;
        *self.inner.id_strategy.write() = id_strategy;
        Ok(())
    }

    pub fn autosync(&self) -> bool {
        self.inner.autosync.load(Ordering::Relaxed)
    }

    pub fn set_autosync(&self, autosync: bool) -> DocStoreResult<()> {
        self.inner.ensure_configurable("Autosync")?;
        self.inner.autosync.store(autosync, Ordering::Relaxed);
        Ok(())
    }

    pub fn reserved_keys(&self) -> ReservedKeys {
        self.inner.reserved_keys.read().clone()
    }

    pub fn set_reserved_keys(&self, reserved_keys: ReservedKeys) -> DocStoreResult<()> {
        self.inner.ensure_configurable("Reserved keys")?;
        *self.inner.reserved_keys.write() = reserved_keys;
        Ok(())
    }

    /// Uses `storage` instead of the built-in file or memory storage.
    pub fn set_storage(&self, storage: Arc<dyn StorageAdapter>) -> DocStoreResult<()> {
        self.inner.ensure_configurable("Storage adapter")?;
        if self.inner.directory.get().is_some() {
            log::error!("Custom storage adapter cannot be combined with a storage directory");
            return Err(DocStoreError::new(
                "Custom storage adapter cannot be combined with a storage directory",
                ErrorKind::InvalidOperation,
            ));
        }
        self.inner.storage.set(storage).map_err(|_| {
            log::error!("Storage adapter is already set");
            DocStoreError::new("Storage adapter is already set", ErrorKind::InvalidOperation)
        })
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    /// The settings each collection is opened with.
    pub(crate) fn collection_config(&self) -> CollectionConfig {
        CollectionConfig::new(self.id_strategy(), self.autosync(), self.reserved_keys())
    }

    /// Freezes the configuration and returns the storage it selects.
    pub(crate) fn initialize(&self) -> Arc<dyn StorageAdapter> {
        self.inner.configured.store(true, Ordering::Relaxed);
        if let Some(storage) = self.inner.storage.get() {
            return storage.clone();
        }
        match self.inner.directory.get() {
            Some(directory) => {
                log::debug!("Using file storage at {}", directory.display());
                Arc::new(JsonFileStorage::new(directory))
            }
            None => {
                log::debug!("No storage directory configured, using memory storage");
                Arc::new(MemoryStorage::new())
            }
        }
    }
}

struct DatabaseConfigInner {
    configured: AtomicBool,
    directory: OnceLock<PathBuf>,
    storage: OnceLock<Arc<dyn StorageAdapter>>,
    id_strategy: RwLock<IdStrategy>,
    autosync: AtomicBool,
    reserved_keys: RwLock<ReservedKeys>,
}

impl DatabaseConfigInner {
    fn new() -> Self {
        DatabaseConfigInner {
            configured: AtomicBool::from(false),
            directory: OnceLock::new(),
            storage: OnceLock::new(),
            id_strategy: RwLock::new(IdStrategy::default()),
            autosync: AtomicBool::from(true),
            reserved_keys: RwLock::new(ReservedKeys::default()),
        }
    }

    fn ensure_configurable(&self, setting: &str) -> DocStoreResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{} cannot be changed after initialization", setting);
            return Err(DocStoreError::new(
                &format!("{} cannot be changed after initialization", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}
