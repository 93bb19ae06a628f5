//! Documents and the collections that hold them.
//!
//! A [Collection] keeps its documents in insertion order, keyed by
//! [DocumentId]. Queries are documents in the predicate language (see
//! [crate::filter]), modifiers are documents of update operators, and
//! [QueryOptions] controls joins, sorting, skip/take and projection.

mod collection;
mod collection_config;
pub(crate) mod collection_factory;
mod document;
mod document_id;
mod modifier;
pub(crate) mod operation;
mod query_options;
mod reserved_keys;

pub use collection::*;
pub use collection_config::*;
pub use document::*;
pub use document_id::*;
pub use modifier::*;
pub use query_options::*;
pub use reserved_keys::*;
