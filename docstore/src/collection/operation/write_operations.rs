use super::{CollectionState, SharedState};
use crate::collection::document_id::successor;
use crate::collection::{CollectionConfig, Document, DocumentId, IdStrategy, ModifierSet, QueryOptions};
use crate::common::current_time_millis;
use crate::common::stream::select;
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::filter::Query;
use crate::store::StorageAdapter;
use std::sync::Arc;

/// Mutation side of a collection.
///
/// Every write holds the collection's write lock from matching to commit,
/// computes all of its results before touching the mapping, and then either
/// persists (autosync) or marks the collection dirty.
pub(crate) struct WriteOperations {
    collection_name: String,
    config: CollectionConfig,
    state: SharedState,
    storage: Arc<dyn StorageAdapter>,
}

impl WriteOperations {
    pub fn new(
        collection_name: String,
        config: CollectionConfig,
        state: SharedState,
        storage: Arc<dyn StorageAdapter>,
    ) -> Self {
        WriteOperations {
            collection_name,
            config,
            state,
            storage,
        }
    }

    /// Stores each document under a fresh identifier and returns the stored
    /// forms, in input order.
    pub fn insert(&self, documents: Vec<Document>) -> DocStoreResult<Vec<Document>> {
        let id_key = self.config.reserved_keys().id();
        for document in &documents {
            if let Some(id) = document.get(id_key) {
                log::error!(
                    "Document to insert into '{}' already has an id {}",
                    self.collection_name,
                    id
                );
                return Err(DocStoreError::new(
                    &format!("Document to insert already has an id {}", id),
                    ErrorKind::InvalidId,
                ));
            }
        }

        let mut state = self.state.write();
        let last_issued_id = state.last_issued_id;
        let now = current_time_millis();
        let mut stamped = Vec::with_capacity(documents.len());
        for document in documents {
            let next = self
                .next_id(&mut state)
                .and_then(|id| Ok((id.clone(), self.stamp(document, &id, now)?)));
            match next {
                Ok(entry) => stamped.push(entry),
                Err(err) => {
                    state.last_issued_id = last_issued_id;
                    return Err(err);
                }
            }
        }

        let mut inserted = Vec::with_capacity(stamped.len());
        for (id, stored) in stamped {
            state.documents.insert(id, stored.clone());
            inserted.push(stored);
        }

        log::debug!(
            "Inserted {} documents into collection '{}'",
            inserted.len(),
            self.collection_name
        );
        self.after_write(&mut state)?;
        Ok(inserted)
    }

    /// Applies `modifiers` to the selected matches and returns their new
    /// forms. Nothing is committed unless every document updates cleanly.
    pub fn update(
        &self,
        query: &Query,
        modifiers: &ModifierSet,
        options: &QueryOptions,
    ) -> DocStoreResult<Vec<Document>> {
        let mut state = self.state.write();
        let targets = self.select_targets(&state, query, options)?;

        let now = current_time_millis();
        let mut updates = Vec::with_capacity(targets.len());
        for original in &targets {
            let id = self.id_of(original)?;
            let mut updated = modifiers.apply(original, query)?;
            self.restore_reserved(original, &mut updated, now)?;
            updates.push((id, updated));
        }

        if updates.is_empty() {
            return Ok(Vec::new());
        }

        for (id, updated) in &updates {
            state.documents.insert(id.clone(), updated.clone());
        }

        log::debug!(
            "Updated {} documents in collection '{}'",
            updates.len(),
            self.collection_name
        );
        self.after_write(&mut state)?;
        Ok(updates.into_iter().map(|(_, document)| document).collect())
    }

    /// Deletes the selected matches and returns them as they were.
    pub fn remove(&self, query: &Query, options: &QueryOptions) -> DocStoreResult<Vec<Document>> {
        let mut state = self.state.write();
        let targets = self.select_targets(&state, query, options)?;
        let ids = targets
            .iter()
            .map(|document| self.id_of(document))
            .collect::<DocStoreResult<Vec<_>>>()?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        for id in &ids {
            state.documents.shift_remove(id);
        }

        log::debug!(
            "Removed {} documents from collection '{}'",
            ids.len(),
            self.collection_name
        );
        self.after_write(&mut state)?;
        Ok(targets)
    }

    /// Writes the collection to storage if it has unsaved changes.
    pub fn sync(&self) -> DocStoreResult<()> {
        let mut state = self.state.write();
        if !state.dirty {
            return Ok(());
        }
        self.storage.persist(&self.collection_name, &state.documents)?;
        state.dirty = false;
        Ok(())
    }

    fn select_targets(
        &self,
        state: &CollectionState,
        query: &Query,
        options: &QueryOptions,
    ) -> DocStoreResult<Vec<Document>> {
        let matched = state
            .documents
            .values()
            .filter(|document| query.matches(document))
            .cloned();
        select(matched, options)
    }

    fn after_write(&self, state: &mut CollectionState) -> DocStoreResult<()> {
        state.dirty = true;
        if self.config.autosync() {
            self.storage.persist(&self.collection_name, &state.documents)?;
            state.dirty = false;
        }
        Ok(())
    }

    fn next_id(&self, state: &mut CollectionState) -> DocStoreResult<DocumentId> {
        let strategy = self.config.id_strategy();
        let id = strategy.next(&state.documents)?;
        match (strategy, id) {
            // never hand out an integer id again, even after its document is removed
            (IdStrategy::Sequential, DocumentId::Int(candidate)) => {
                let issued = candidate.max(successor(state.last_issued_id)?);
                state.last_issued_id = issued;
                Ok(DocumentId::Int(issued))
            }
            (_, id) => Ok(id),
        }
    }

    /// Builds the stored form: identifier first, then the caller's properties,
    /// then both timestamps.
    fn stamp(&self, document: Document, id: &DocumentId, now: i64) -> DocStoreResult<Document> {
        let keys = self.config.reserved_keys();
        let mut stored = Document::new();
        stored.put(keys.id(), id)?;
        for (key, value) in document {
            if key != keys.created_at() && key != keys.updated_at() {
                stored.put(key, value)?;
            }
        }
        stored.put(keys.created_at(), now)?;
        stored.put(keys.updated_at(), now)?;
        Ok(stored)
    }

    fn restore_reserved(
        &self,
        original: &Document,
        updated: &mut Document,
        now: i64,
    ) -> DocStoreResult<()> {
        let keys = self.config.reserved_keys();
        for key in [keys.id(), keys.created_at()] {
            match original.get(key) {
                Some(value) => updated.put(key, value.clone())?,
                None => {
                    updated.remove(key);
                }
            }
        }
        updated.put(keys.updated_at(), now)
    }

    fn id_of(&self, document: &Document) -> DocStoreResult<DocumentId> {
        match document.get(self.config.reserved_keys().id()) {
            Some(value) => DocumentId::from_value(value),
            None => {
                log::error!(
                    "Stored document in collection '{}' has no id",
                    self.collection_name
                );
                Err(DocStoreError::new(
                    "Stored document has no id",
                    ErrorKind::InternalError,
                ))
            }
        }
    }
}
