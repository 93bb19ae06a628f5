//! Storage backends.
//!
//! A collection keeps its documents in memory and hands the whole mapping to
//! a [StorageAdapter] at load and persistence points. Every persist is a
//! single superseding write of the full collection; there is no append log.
//!
//! Two adapters ship with the crate:
//! - [JsonFileStorage] writes one JSON file per collection under a directory.
//! - [MemoryStorage] keeps the last persisted mapping in memory.

mod json_file;
mod memory;

pub use json_file::*;
pub use memory::*;

use crate::collection::{Document, DocumentId};
use crate::errors::DocStoreResult;
use indexmap::IndexMap;

/// A collection's documents keyed by identifier, in insertion order.
pub type DocumentMap = IndexMap<DocumentId, Document>;

/// Loads and persists whole collections.
pub trait StorageAdapter: Send + Sync {
    /// Loads the named collection. A collection that was never persisted,
    /// or whose stored form cannot be decoded, loads as empty.
    fn load(&self, collection: &str) -> DocStoreResult<DocumentMap>;

    /// Replaces the stored form of the named collection with `documents`.
    /// Either the whole mapping is stored or nothing changes.
    fn persist(&self, collection: &str, documents: &DocumentMap) -> DocStoreResult<()>;

    /// Checks whether the named collection has been persisted.
    fn exists(&self, collection: &str) -> bool;

    /// Names of every persisted collection.
    fn collection_names(&self) -> DocStoreResult<Vec<String>>;
}
