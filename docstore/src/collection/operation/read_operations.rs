use super::SharedState;
use crate::collection::{CollectionConfig, Document, DocumentId, QueryOptions};
use crate::common::stream::{shape, JoinSource};
use crate::errors::DocStoreResult;
use crate::filter::Query;

/// Query side of a collection.
///
/// Matching runs under the read lock against the in-memory mapping and
/// clones what it finds. Joins, sorting and projection run after the lock is
/// released, so a join may read this same collection.
pub(crate) struct ReadOperations {
    collection_name: String,
    config: CollectionConfig,
    state: SharedState,
}

impl ReadOperations {
    pub fn new(collection_name: String, config: CollectionConfig, state: SharedState) -> Self {
        ReadOperations {
            collection_name,
            config,
            state,
        }
    }

    pub fn find(
        &self,
        query: &Query,
        options: &QueryOptions,
        source: Option<&dyn JoinSource>,
    ) -> DocStoreResult<Vec<Document>> {
        let matched = self.matching(query);
        log::debug!(
            "Query {} matched {} documents in collection '{}'",
            query,
            matched.len(),
            self.collection_name
        );
        shape(
            matched.into_iter(),
            options,
            source,
            self.config.reserved_keys().id(),
        )
    }

    pub fn get_by_id(&self, id: &DocumentId) -> Option<Document> {
        self.state.read().documents.get(id).cloned()
    }

    /// Every document in collection order.
    pub fn snapshot(&self) -> Vec<Document> {
        self.state.read().documents.values().cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.state.read().documents.len()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.state.read().dirty
    }

    fn matching(&self, query: &Query) -> Vec<Document> {
        let state = self.state.read();
        if query.is_empty() {
            return state.documents.values().cloned().collect();
        }
        state
            .documents
            .values()
            .filter(|document| query.matches(document))
            .cloned()
            .collect()
    }
}
