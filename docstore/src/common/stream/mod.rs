mod joined_cursor;
mod projected_cursor;
mod sorted_stream;

pub use joined_cursor::JoinSource;
pub(crate) use joined_cursor::JoinedStream;
pub(crate) use projected_cursor::ProjectedStream;
pub(crate) use sorted_stream::SortedStream;

use crate::collection::{Document, JoinSpec, QueryOptions};
use crate::errors::DocStoreResult;

/// Runs the full result pipeline: join, sort, skip/take, project.
pub(crate) fn shape<I: Iterator<Item = Document>>(
    documents: I,
    options: &QueryOptions,
    source: Option<&dyn JoinSource>,
    id_key: &str,
) -> DocStoreResult<Vec<Document>> {
    let joined = JoinedStream::new(documents, options.joins(), source, id_key)?;
    let sorted = SortedStream::new(joined, options.sort_order())?;
    let windowed = window(sorted, options);
    Ok(ProjectedStream::new(windowed, options.projection(), id_key).collect())
}

/// Picks the documents an update or remove affects: sort, then skip/take.
pub(crate) fn select<I: Iterator<Item = Document>>(
    documents: I,
    options: &QueryOptions,
) -> DocStoreResult<Vec<Document>> {
    let sorted = SortedStream::new(documents.map(Ok), options.sort_order())?;
    Ok(window(sorted, options).collect())
}

/// Shapes documents already selected by [select]: join, then project.
pub(crate) fn present(
    documents: Vec<Document>,
    options: &QueryOptions,
    source: Option<&dyn JoinSource>,
    id_key: &str,
) -> DocStoreResult<Vec<Document>> {
    let joined = JoinedStream::new(documents.into_iter(), options.joins(), source, id_key)?
        .collect::<DocStoreResult<Vec<_>>>()?;
    Ok(ProjectedStream::new(joined.into_iter(), options.projection(), id_key).collect())
}

/// Checks every join, nested joins included, and loads each target
/// collection through `source`. Once this succeeds, shaping with the same
/// joins only reads collections that are already open.
pub(crate) fn prepare_joins(joins: &[JoinSpec], source: Option<&dyn JoinSource>) -> DocStoreResult<()> {
    for join in joins {
        join.validate()?;
        if let Some(source) = source {
            source.join_documents(join.collection())?;
        }
        prepare_joins(join.options().joins(), source)?;
    }
    Ok(())
}

fn window<I: Iterator<Item = Document>>(
    documents: I,
    options: &QueryOptions,
) -> impl Iterator<Item = Document> {
    documents
        .skip(options.skip_count().unwrap_or(0))
        .take(options.take_count().unwrap_or(usize::MAX))
}
