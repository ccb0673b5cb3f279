use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::collection::Collection;
use crate::common::{atomic, Atomic};

/// Error kinds for migration engine operations.
///
/// Each kind describes a category of failure so callers can decide between
/// fixing their input, reporting a refused run, or surfacing a broken
/// migration.
///
/// # Examples
///
/// ```rust
/// use baleen::errors::{BaleenError, BaleenResult, ErrorKind};
///
/// fn example() -> BaleenResult<()> {
///     Err(BaleenError::new("Version not found", ErrorKind::NotFound))
/// }
/// assert!(example().is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Construction Errors
    /// Malformed input such as an empty id or a zero progress total
    InvalidArgument,

    // Collection Errors
    /// A version with the same id is already part of the collection
    AlreadyExists,
    /// The requested version or alias could not be found
    NotFound,
    /// The collection was mutated after its last sort and cannot be walked
    CollectionNotSorted,

    // Runner Errors
    /// A version already matches the requested direction and skips are
    /// configured to fail
    RefuseToRun,
    /// A migration body failed while running
    MigrationFailed,
    /// A transactional migration failed and its abort failed as well
    TransactionFailed,

    // Storage Errors
    /// The storage collaborator could not read or write applied versions
    StorageError,
    /// Generic IO error
    IOError,
    /// Stored data could not be decoded
    EncodingError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::AlreadyExists => write!(f, "Already exists"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::CollectionNotSorted => write!(f, "Collection not sorted"),
            ErrorKind::RefuseToRun => write!(f, "Refuse to run"),
            ErrorKind::MigrationFailed => write!(f, "Migration failed"),
            ErrorKind::TransactionFailed => write!(f, "Transaction failed"),
            ErrorKind::StorageError => write!(f, "Storage error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom error type of the migration engine.
///
/// `BaleenError` carries a message, an [ErrorKind] and an optional cause so
/// that failures can be chained (for example an `abort()` failure chained to
/// the migration failure that triggered it). A backtrace is captured at
/// construction for debugging.
///
/// # Examples
///
/// ```rust
/// use baleen::errors::{BaleenError, ErrorKind};
///
/// let cause = BaleenError::new("connection lost", ErrorKind::IOError);
/// let err = BaleenError::new_with_cause("up() failed", ErrorKind::MigrationFailed, cause);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct BaleenError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<BaleenError>>,
    backtrace: Atomic<Backtrace>,
}

impl BaleenError {
    /// Creates a new error with the specified message and kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        BaleenError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new error chained to the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: BaleenError) -> Self {
        BaleenError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&BaleenError> {
        self.cause.as_deref()
    }
}

impl Display for BaleenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for BaleenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for BaleenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for engine operations.
pub type BaleenResult<T> = Result<T, BaleenError>;

/// Failure of a batch run.
///
/// A batch stops at the first failing migration. The versions whose state was
/// changed before the failure are handed back in `changed` so the caller can
/// persist them even though the run was aborted.
#[derive(Debug)]
pub struct BatchError {
    pub changed: Collection,
    pub error: BaleenError,
}

impl BatchError {
    /// Creates a batch error with an empty changed set, used when a run fails
    /// before any migration was executed.
    pub fn new(error: BaleenError) -> Self {
        BatchError {
            changed: Collection::new(),
            error,
        }
    }

    pub fn with_changed(changed: Collection, error: BaleenError) -> Self {
        BatchError { changed, error }
    }

    pub fn kind(&self) -> &ErrorKind {
        self.error.kind()
    }
}

impl Display for BatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} version(s) changed before the failure)",
            self.error,
            self.changed.len()
        )
    }
}

impl Error for BatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

impl From<BaleenError> for BatchError {
    fn from(error: BaleenError) -> Self {
        BatchError::new(error)
    }
}

impl From<BatchError> for BaleenError {
    fn from(err: BatchError) -> Self {
        err.error
    }
}

/// Result of a batch run: the sub-collection of versions actually changed.
pub type BatchResult = Result<Collection, BatchError>;

impl From<std::io::Error> for BaleenError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::IOError,
        };
        BaleenError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<std::string::FromUtf8Error> for BaleenError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        BaleenError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}
