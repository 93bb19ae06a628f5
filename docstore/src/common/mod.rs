//! Shared building blocks: values, property paths, sort order and the
//! result-shaping streams used by the collection operations.

mod constants;
mod date_utils;
mod path;
mod sort_order;
pub(crate) mod stream;
mod value;

pub use constants::*;
pub use date_utils::*;
pub use path::*;
pub use sort_order::*;
pub use value::*;
