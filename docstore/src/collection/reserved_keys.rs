use crate::common::{DOC_CREATED_AT, DOC_ID, DOC_UPDATED_AT};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};

/// Names of the three properties every stored document carries.
///
/// The names are fixed when a database is opened and copied into each
/// collection it creates. Documents already on disk keep whatever names they
/// were written with.
///
/// # Examples
///
/// ```rust
/// use docstore::collection::ReservedKeys;
///
/// let keys = ReservedKeys::new("id", "created", "modified").unwrap();
/// assert_eq!(keys.id(), "id");
/// assert!(keys.is_reserved("modified"));
/// assert_eq!(ReservedKeys::default().id(), "_id");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservedKeys {
    id: String,
    created_at: String,
    updated_at: String,
}

impl ReservedKeys {
    /// Creates a set of reserved key names.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if a name is empty or two names collide.
    pub fn new(id: &str, created_at: &str, updated_at: &str) -> DocStoreResult<ReservedKeys> {
        if id.is_empty() || created_at.is_empty() || updated_at.is_empty() {
            log::error!("Reserved key names cannot be empty");
            return Err(DocStoreError::new(
                "Reserved key names cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        if id == created_at || id == updated_at || created_at == updated_at {
            log::error!(
                "Reserved key names must be distinct, found {}, {}, {}",
                id,
                created_at,
                updated_at
            );
            return Err(DocStoreError::new(
                "Reserved key names must be distinct",
                ErrorKind::InvalidOperation,
            ));
        }

        Ok(ReservedKeys {
            id: id.to_string(),
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    pub fn is_reserved(&self, key: &str) -> bool {
        key == self.id || key == self.created_at || key == self.updated_at
    }
}

impl Default for ReservedKeys {
    fn default() -> Self {
        ReservedKeys {
            id: DOC_ID.to_string(),
            created_at: DOC_CREATED_AT.to_string(),
            updated_at: DOC_UPDATED_AT.to_string(),
        }
    }
}
