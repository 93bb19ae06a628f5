use crate::collection::{IdStrategy, ReservedKeys};
use crate::database::Database;
use crate::database_config::DatabaseConfig;
use crate::errors::{DocStoreError, DocStoreResult};
use crate::store::StorageAdapter;
use std::path::Path;
use std::sync::Arc;

/// Builder for opening a [Database].
///
/// Configuration errors are captured as they happen and returned from
/// [DatabaseBuilder::open_or_create], so the calls can be chained freely.
///
/// # Examples
///
/// ```rust
/// use docstore::database::Database;
/// use docstore::collection::IdStrategy;
///
/// // in memory, sequential ids, every write persisted immediately
/// let db = Database::builder().open_or_create().unwrap();
///
/// let db = Database::builder()
///     .id_strategy(IdStrategy::Opaque)
///     .autosync(false)
///     .reserved_keys("id", "created", "modified")
///     .open_or_create()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct DatabaseBuilder {
    error: Option<DocStoreError>,
    config: DatabaseConfig,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        DatabaseBuilder {
            error: None,
            config: DatabaseConfig::new(),
        }
    }

    /// Stores each collection as `<directory>/<collection>.json`. Without a
    /// directory the database lives in memory.
    pub fn directory<P: AsRef<Path>>(mut self, directory: P) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_directory(directory) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_id_strategy(id_strategy) {
                self.error = Some(e);
            }
        }
        self
    }

    /// When false, changes stay in memory until [Database::commit] or a
    /// collection's `sync`.
    pub fn autosync(mut self, autosync: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_autosync(autosync) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Renames the identifier and timestamp properties of new documents.
    pub fn reserved_keys(mut self, id: &str, created_at: &str, updated_at: &str) -> Self {
        if self.error.is_none() {
            let result = ReservedKeys::new(id, created_at, updated_at)
                .and_then(|keys| self.config.set_reserved_keys(keys));
            if let Err(e) = result {
                self.error = Some(e);
            }
        }
        self
    }

    /// Plugs in a storage backend other than the built-in ones.
    pub fn storage(mut self, storage: Arc<dyn StorageAdapter>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_storage(storage) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the database, or returns the first configuration error.
    pub fn open_or_create(self) -> DocStoreResult<Database> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(Database::new(self.config))
    }
}
