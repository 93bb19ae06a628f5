use crate::common::Value;
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// The identifier of a document within its collection.
///
/// Identifiers are stored in the document under the identifier reserved key
/// and are unique within a collection for its lifetime.
///
/// # Examples
///
/// ```rust
/// use docstore::collection::DocumentId;
/// use docstore::common::Value;
///
/// let id = DocumentId::from_value(&Value::I64(7)).unwrap();
/// assert_eq!(id, DocumentId::Int(7));
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentId {
    /// A sequential integer identifier.
    Int(i64),
    /// An opaque string identifier.
    Str(String),
}

impl DocumentId {
    /// Reads an identifier from a document value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the value is neither an integer nor a
    /// non-empty string.
    pub fn from_value(value: &Value) -> DocStoreResult<DocumentId> {
        match value {
            Value::I64(id) => Ok(DocumentId::Int(*id)),
            Value::String(id) if !id.is_empty() => Ok(DocumentId::Str(id.clone())),
            _ => {
                log::error!("Invalid document id {}", value);
                Err(DocStoreError::new(
                    &format!("Invalid document id {}", value),
                    ErrorKind::InvalidId,
                ))
            }
        }
    }

    /// Reads an identifier from a storage key. A key that is the canonical
    /// decimal form of an `i64` is an integer identifier.
    pub fn parse(key: &str) -> DocumentId {
        match key.parse::<i64>() {
            Ok(id) if id.to_string() == key => DocumentId::Int(id),
            _ => DocumentId::Str(key.to_string()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            DocumentId::Int(id) => Value::I64(*id),
            DocumentId::Str(id) => Value::String(id.clone()),
        }
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentId::Int(id) => write!(f, "{}", id),
            DocumentId::Str(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for DocumentId {
    fn from(value: i64) -> Self {
        DocumentId::Int(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        DocumentId::Str(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        DocumentId::Str(value)
    }
}

impl From<DocumentId> for Value {
    fn from(value: DocumentId) -> Self {
        value.to_value()
    }
}

impl From<&DocumentId> for Value {
    fn from(value: &DocumentId) -> Self {
        value.to_value()
    }
}

/// How a collection generates identifiers for inserted documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// One more than the largest integer identifier in the collection,
    /// starting at 1.
    #[default]
    Sequential,
    /// A random UUID (v4) in its simple 32-character form.
    Opaque,
}

impl IdStrategy {
    /// Generates an identifier not present in `existing`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` once the sequential id space is exhausted.
    pub fn next<V>(&self, existing: &IndexMap<DocumentId, V>) -> DocStoreResult<DocumentId> {
        match self {
            IdStrategy::Sequential => {
                let max = existing
                    .keys()
                    .filter_map(|id| match id {
                        DocumentId::Int(value) => Some(*value),
                        DocumentId::Str(_) => None,
                    })
                    .max()
                    .unwrap_or(0);
                successor(max).map(DocumentId::Int)
            }
            IdStrategy::Opaque => loop {
                let id = DocumentId::Str(Uuid::new_v4().simple().to_string());
                if !existing.contains_key(&id) {
                    break Ok(id);
                }
            },
        }
    }
}

/// The next sequential identifier after `id`.
pub(crate) fn successor(id: i64) -> DocStoreResult<i64> {
    id.checked_add(1).ok_or_else(|| {
        log::error!("Sequential id space exhausted after {}", id);
        DocStoreError::new("Sequential id space exhausted", ErrorKind::InvalidId)
    })
}
