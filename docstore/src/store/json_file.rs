use crate::collection::{Document, DocumentId};
use crate::common::{FILE_EXTENSION, TEMP_FILE_SUFFIX};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::store::{DocumentMap, StorageAdapter};
use indexmap::IndexMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

/// File storage writing each collection to `<directory>/<collection>.json`.
///
/// The file holds a single JSON object mapping each identifier to its
/// document, in collection order. A persist writes a sibling temporary file
/// and renames it over the old one, so readers see either the old or the
/// new collection. The directory is created on the first persist.
///
/// # Examples
///
/// ```rust,no_run
/// use docstore::store::{JsonFileStorage, StorageAdapter};
///
/// let storage = JsonFileStorage::new("/var/lib/planets");
/// let documents = storage.load("planets").unwrap();
/// storage.persist("planets", &documents).unwrap();
/// ```
pub struct JsonFileStorage {
    directory: PathBuf,
}

impl JsonFileStorage {
    pub fn new<P: AsRef<Path>>(directory: P) -> JsonFileStorage {
        JsonFileStorage {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The file backing the named collection.
    pub fn file_path(&self, collection: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}", collection, FILE_EXTENSION))
    }

    fn temp_file_path(&self, collection: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}.{}", collection, FILE_EXTENSION, TEMP_FILE_SUFFIX))
    }
}

impl StorageAdapter for JsonFileStorage {
    fn load(&self, collection: &str) -> DocStoreResult<DocumentMap> {
        let path = self.file_path(collection);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                log::debug!("No file for collection '{}' at {}", collection, path.display());
                return Ok(DocumentMap::new());
            }
            Err(e) => {
                log::error!("Failed to read collection '{}' from {}: {}", collection, path.display(), e);
                return Err(DocStoreError::new_with_cause(
                    &format!("Failed to read collection '{}'", collection),
                    ErrorKind::StorageError,
                    e.into(),
                ));
            }
        };

        match serde_json::from_str::<IndexMap<String, Document>>(&content) {
            Ok(stored) => {
                log::debug!("Loaded {} documents for collection '{}'", stored.len(), collection);
                Ok(stored
                    .into_iter()
                    .map(|(key, document)| (DocumentId::parse(&key), document))
                    .collect())
            }
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable file {} for collection '{}': {}",
                    path.display(),
                    collection,
                    e
                );
                Ok(DocumentMap::new())
            }
        }
    }

    fn persist(&self, collection: &str, documents: &DocumentMap) -> DocStoreResult<()> {
        let stored: IndexMap<String, &Document> = documents
            .iter()
            .map(|(id, document)| (id.to_string(), document))
            .collect();

        let wrap = |e: DocStoreError| {
            log::error!("Failed to persist collection '{}': {}", collection, e);
            DocStoreError::new_with_cause(
                &format!("Failed to persist collection '{}'", collection),
                ErrorKind::StorageError,
                e,
            )
        };

        let json = serde_json::to_string_pretty(&stored).map_err(|e| wrap(e.into()))?;
        fs::create_dir_all(&self.directory).map_err(|e| wrap(e.into()))?;

        let temp_path = self.temp_file_path(collection);
        fs::write(&temp_path, json).map_err(|e| wrap(e.into()))?;
        fs::rename(&temp_path, self.file_path(collection)).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            wrap(e.into())
        })?;

        log::debug!("Persisted {} documents for collection '{}'", documents.len(), collection);
        Ok(())
    }

    fn exists(&self, collection: &str) -> bool {
        self.file_path(collection).is_file()
    }

    fn collection_names(&self) -> DocStoreResult<Vec<String>> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                log::error!("Failed to list {}: {}", self.directory.display(), e);
                return Err(DocStoreError::new_with_cause(
                    &format!("Failed to list {}", self.directory.display()),
                    ErrorKind::StorageError,
                    e.into(),
                ));
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
