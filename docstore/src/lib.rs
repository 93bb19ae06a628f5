//! # docstore - Embedded JSON Document Store
//!
//! docstore keeps named collections of schemaless JSON documents, each
//! collection persisted as one JSON file in a directory (or held in memory).
//!
//! ## Key Features
//!
//! - **Predicate queries**: documents such as `{ "diameter": { "$gt": 12000 } }`
//!   with `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$regex`,
//!   `$and` and `$or`
//! - **Flexible lookup**: a field name matches at any depth of a document
//! - **Update modifiers**: `$inc`, `$set`, `$unset`, `$push` and `$merge`
//! - **Query options**: sort, skip, take, projection and cross-collection joins
//! - **Reserved keys**: every document carries an identifier plus creation and
//!   update timestamps
//!
//! ## Quick Start
//!
//! ```rust
//! use docstore::collection::{QueryOptions, JoinSpec};
//! use docstore::database::Database;
//! use docstore::doc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::builder().open_or_create()?;
//!
//! let users = db.collection("users")?;
//! let products = db.collection("products")?;
//! products.insert(doc! { sku: 1, title: "lamp" })?;
//! products.insert(doc! { sku: 2, title: "desk" })?;
//! users.insert(doc! { name: "ann", purchased: [1, 2] })?;
//!
//! let options = QueryOptions::new()
//!     .join(JoinSpec::new("products", "purchased", "sku", "items"))
//!     .exclude("purchased");
//! let found = users.find_with_options(&doc! { name: "ann" }, &options)?;
//! assert_eq!(found[0].get("items").and_then(|v| v.as_array()).map(|a| a.len()), Some(2));
//!
//! db.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, identifiers, collections, modifiers and query options
//! - [`common`] - Values, property paths, sort order and shared constants
//! - [`database`] - The database handle
//! - [`database_builder`] - Builder for opening a database
//! - [`database_config`] - Database settings
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - The predicate query language
//! - [`store`] - Storage adapters for file and memory persistence

pub mod collection;
pub mod common;
pub mod database;
pub mod database_builder;
pub mod database_config;
pub mod errors;
pub mod filter;
pub mod store;

pub use collection::{Collection, Document, DocumentId};
pub use common::Value;
pub use database::Database;
pub use errors::{DocStoreError, DocStoreResult, ErrorKind};
