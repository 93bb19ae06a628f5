mod read_operations;
mod write_operations;

pub(crate) use read_operations::*;
pub(crate) use write_operations::*;

use crate::store::DocumentMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// The in-memory side of a collection.
pub(crate) struct CollectionState {
    pub(crate) documents: DocumentMap,
    /// Set when the in-memory mapping differs from what storage holds.
    pub(crate) dirty: bool,
    /// Highest integer identifier handed out so far.
    pub(crate) last_issued_id: i64,
}

impl CollectionState {
    pub(crate) fn new(documents: DocumentMap) -> Self {
        CollectionState {
            documents,
            dirty: false,
            last_issued_id: 0,
        }
    }
}

pub(crate) type SharedState = Arc<RwLock<CollectionState>>;
