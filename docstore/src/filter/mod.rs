//! The query language.
//!
//! A query is written as a [Document](crate::collection::Document) and parsed
//! into a [Query] before it touches any data. Keys of a query document are
//! either logical combinators or property names:
//!
//! - `$and` / `$or` map to an array of sub-queries.
//! - A property name maps to a literal (deep equality), a nested query
//!   (structural match against a nested document) or an operator mapping.
//!
//! Property names are resolved with the flexible lookup of
//! [`locate`](crate::common::locate), so `{ avg: 475 }` also matches a document
//! holding `avg` under `temp`.
//!
//! # Supported Operators
//!
//! - **Equality**: `$eq`, `$ne`
//! - **Comparison**: `$gt`, `$gte`, `$lt`, `$lte`
//! - **Membership**: `$in`, `$nin`
//! - **Pattern**: `$regex`
//! - **Logical**: `$and`, `$or`
//!
//! # Examples
//!
//! ```rust
//! use docstore::doc;
//! use docstore::filter::Query;
//!
//! let query = Query::parse(&doc! { diameter: { "$gt": 12000 } }).unwrap();
//! assert!(query.matches(&doc! { diameter: 12742 }));
//! assert!(!query.matches(&doc! { diameter: 4880 }));
//! ```

mod comparison;
mod query;

pub use comparison::*;
pub use query::*;
