//! Structured error handling for storage operations.

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors surfaced by locations, containers and items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The requested container or item does not exist.
    NotFound,
    /// A URL was handed to a backend that does not own its scheme.
    SchemeMismatch,
    /// Caller-supplied data was rejected before reaching the backend.
    Validation,
    /// A required configuration key is absent.
    MissingConfig,
    /// Any other failure reported by the backend client, passed through.
    Backend,
    /// The operation exceeded its configured time budget.
    Timeout,
    /// The operation was cancelled through its cancellation token.
    Cancelled,
    /// No backend is registered under the requested kind.
    UnknownKind,
}

/// Structured error type with classification and an optional source.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<String>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Creates a new not found error.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// Creates a new scheme mismatch error.
    pub fn scheme_mismatch() -> Self {
        Self::new(ErrorKind::SchemeMismatch)
    }

    /// Creates a new validation error.
    pub fn validation() -> Self {
        Self::new(ErrorKind::Validation)
    }

    /// Creates a new missing configuration error.
    pub fn missing_config() -> Self {
        Self::new(ErrorKind::MissingConfig)
    }

    /// Creates a new backend error.
    pub fn backend() -> Self {
        Self::new(ErrorKind::Backend)
    }

    /// Creates a new timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Creates a new cancellation error.
    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled)
    }

    /// Creates a new unknown kind error.
    pub fn unknown_kind() -> Self {
        Self::new(ErrorKind::UnknownKind)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns `true` if this is a [`ErrorKind::NotFound`] error.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Re-classifies this error as [`ErrorKind::NotFound`], keeping the
    /// original error as the source.
    ///
    /// Timeouts and cancellations are returned untouched: they say nothing
    /// about whether the entity exists.
    pub fn into_not_found(self, message: impl Into<String>) -> Self {
        match self.kind {
            ErrorKind::NotFound | ErrorKind::Timeout | ErrorKind::Cancelled => self,
            _ => Self::from_source(ErrorKind::NotFound, self).with_message(message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::from_source(ErrorKind::Backend, error).with_message("I/O operation failed")
    }
}
