use backtrace::Backtrace;
use serde::{de, ser};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for docstore operations.
///
/// Each kind names one category of failure so callers can decide whether to
/// retry, log or abort without parsing messages.
///
/// # Examples
///
/// ```rust
/// use docstore::errors::{DocStoreError, DocStoreResult, ErrorKind};
///
/// fn example() -> DocStoreResult<()> {
///     Err(DocStoreError::new("unknown operator $foo", ErrorKind::UnknownOperator))
/// }
/// assert!(example().is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Query and update errors
    /// A query or modifier used an operator key that is not recognized
    UnknownOperator,
    /// A query, or its options, has an invalid shape or payload
    MalformedQuery,
    /// A modifier has an invalid payload
    MalformedModifier,
    /// A value has the wrong type for the requested operation
    InvalidDataType,

    // Identity errors
    /// The provided identifier is invalid or already taken
    InvalidId,

    // Operation errors
    /// The operation is not valid in the current context
    InvalidOperation,

    // Storage errors
    /// Loading or persisting a collection failed
    StorageError,
    /// Generic IO error
    IOError,
    /// Error encoding or decoding data
    EncodingError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::UnknownOperator => write!(f, "Unknown operator"),
            ErrorKind::MalformedQuery => write!(f, "Malformed query"),
            ErrorKind::MalformedModifier => write!(f, "Malformed modifier"),
            ErrorKind::InvalidDataType => write!(f, "Invalid data type"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::StorageError => write!(f, "Storage error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// The docstore error type.
///
/// `DocStoreError` carries a message, an [ErrorKind], an optional cause and a
/// backtrace captured at construction time.
///
/// # Examples
///
/// ```rust
/// use docstore::errors::{DocStoreError, ErrorKind};
///
/// let cause = DocStoreError::new("disk unplugged", ErrorKind::IOError);
/// let err = DocStoreError::new_with_cause("failed to persist users", ErrorKind::StorageError, cause);
/// assert_eq!(err.kind(), &ErrorKind::StorageError);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct DocStoreError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DocStoreError>>,
    backtrace: Arc<Backtrace>,
}

impl DocStoreError {
    /// Creates a new `DocStoreError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DocStoreError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `DocStoreError` wrapping an underlying cause.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DocStoreError) -> Self {
        DocStoreError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&DocStoreError> {
        self.cause.as_deref()
    }
}

impl Display for DocStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DocStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for DocStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for docstore operations.
pub type DocStoreResult<T> = Result<T, DocStoreError>;

impl de::Error for DocStoreError {
    fn custom<T: Display>(msg: T) -> Self {
        DocStoreError::new(&msg.to_string(), ErrorKind::EncodingError)
    }
}

impl ser::Error for DocStoreError {
    fn custom<T: Display>(msg: T) -> Self {
        DocStoreError::new(&msg.to_string(), ErrorKind::EncodingError)
    }
}

impl From<std::io::Error> for DocStoreError {
    fn from(err: std::io::Error) -> Self {
        DocStoreError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<serde_json::Error> for DocStoreError {
    fn from(err: serde_json::Error) -> Self {
        DocStoreError::new(&format!("JSON error: {}", err), ErrorKind::EncodingError)
    }
}
