use crate::collection::Document;
use crate::common::{lookup, SortOrder};
use crate::errors::DocStoreResult;
use std::cmp::Ordering;

/// Collects a stream of documents and yields them in sort order.
///
/// The sort is stable, so documents equal on every key keep their input
/// order. Sort keys use the flexible property lookup. A document lacking a
/// key sorts after every document that has it, in both directions.
pub(crate) struct SortedStream {
    sorted: std::vec::IntoIter<Document>,
}

impl SortedStream {
    /// Fails fast with the first error in `raw_stream`.
    pub fn new<I: Iterator<Item = DocStoreResult<Document>>>(
        raw_stream: I,
        sort_order: &[(String, SortOrder)],
    ) -> DocStoreResult<Self> {
        let mut documents = raw_stream.collect::<DocStoreResult<Vec<Document>>>()?;
        if !sort_order.is_empty() {
            documents.sort_by(|a, b| compare_documents(a, b, sort_order));
        }

        Ok(Self {
            sorted: documents.into_iter(),
        })
    }
}

pub(crate) fn compare_documents(
    a: &Document,
    b: &Document,
    sort_order: &[(String, SortOrder)],
) -> Ordering {
    for (name, order) in sort_order {
        let cmp = match (lookup(a, name), lookup(b, name)) {
            (Some(a_value), Some(b_value)) => match order {
                SortOrder::Ascending => a_value.cmp(b_value),
                SortOrder::Descending => a_value.cmp(b_value).reverse(),
            },
            // missing keys go last regardless of direction
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    Ordering::Equal
}

impl Iterator for SortedStream {
    type Item = Document;

    fn next(&mut self) -> Option<Self::Item> {
        self.sorted.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.sorted.size_hint()
    }
}
