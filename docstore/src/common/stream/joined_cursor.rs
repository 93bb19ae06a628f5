use crate::collection::{Document, JoinSpec};
use crate::common::stream::shape;
use crate::common::Value;
use crate::errors::DocStoreResult;

/// Supplies the documents of a join's target collection.
pub trait JoinSource: Send + Sync {
    /// Returns a snapshot of the named collection's documents in insertion
    /// order, or `None` when no such collection exists.
    fn join_documents(&self, collection: &str) -> DocStoreResult<Option<Vec<Document>>>;
}

/// Attaches joined documents to every document of a stream.
///
/// Each join's target documents are fetched once when the stream is built.
/// For every input document the `from` property is read as a list of
/// foreign keys (a scalar is a one-element list) and every target whose `to`
/// property equals one of them is collected. The collected documents are
/// shaped with the join's own options, which may join further, and attached
/// under the join's output name; no match attaches an empty array.
pub(crate) struct JoinedStream<'a, I> {
    iter: I,
    lookups: Vec<(&'a JoinSpec, Vec<Document>)>,
    source: Option<&'a dyn JoinSource>,
    id_key: &'a str,
}

impl<'a, I: Iterator<Item = Document>> JoinedStream<'a, I> {
    pub fn new(
        iter: I,
        joins: &'a [JoinSpec],
        source: Option<&'a dyn JoinSource>,
        id_key: &'a str,
    ) -> DocStoreResult<Self> {
        let mut lookups = Vec::with_capacity(joins.len());
        for join in joins {
            join.validate()?;
            let targets = match source {
                Some(source) => source.join_documents(join.collection())?,
                None => None,
            };

            if targets.is_none() {
                log::debug!("Join target collection '{}' does not exist", join.collection());
            }
            lookups.push((join, targets.unwrap_or_default()));
        }

        Ok(JoinedStream {
            iter,
            lookups,
            source,
            id_key,
        })
    }

    fn join(&self, mut document: Document) -> DocStoreResult<Document> {
        for (join, targets) in &self.lookups {
            let foreign_keys = match document.get(join.from()) {
                Some(Value::Array(keys)) => keys.clone(),
                Some(key) => vec![key.clone()],
                None => Vec::new(),
            };

            let matched: Vec<Document> = targets
                .iter()
                .filter(|target| {
                    target
                        .get(join.to())
                        .map(|value| foreign_keys.contains(value))
                        .unwrap_or(false)
                })
                .cloned()
                .collect();

            let shaped = if matched.is_empty() {
                matched
            } else {
                shape(matched.into_iter(), join.options(), self.source, self.id_key)?
            };
            document.put(
                join.as_name(),
                Value::Array(shaped.into_iter().map(Value::Document).collect()),
            )?;
        }
        Ok(document)
    }
}

impl<I: Iterator<Item = Document>> Iterator for JoinedStream<'_, I> {
    type Item = DocStoreResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let document = self.iter.next()?;
        if self.lookups.is_empty() {
            return Some(Ok(document));
        }
        Some(self.join(document))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}
