//! Errors reported by [`StorageClient`](super::StorageClient) implementations.

use thiserror::Error;

/// Result type alias for storage client calls.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Failure of a single storage client call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The bucket or object does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The credentials do not grant access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// The request conflicts with current state, e.g. an existing bucket.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A request precondition did not hold.
    #[error("precondition failed: {0}")]
    Precondition(String),
    /// The service is throttling requests.
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// The service is temporarily unavailable.
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// The request was malformed before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Any other non-success HTTP status.
    #[error("unexpected status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service.
        message: String,
    },
    /// The response body could not be interpreted.
    #[error("malformed response: {0}")]
    Decode(String),
    /// Reading upload content or writing download content failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The HTTP exchange itself failed.
    #[cfg(feature = "reqwest")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Creates a [`ClientError::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates a [`ClientError::Conflict`].
    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    /// Creates a [`ClientError::InvalidRequest`].
    pub fn invalid_request(what: impl Into<String>) -> Self {
        Self::InvalidRequest(what.into())
    }

    /// Creates a [`ClientError::Decode`].
    pub fn decode(what: impl Into<String>) -> Self {
        Self::Decode(what.into())
    }

    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound(message),
            401 | 403 => Self::PermissionDenied(message),
            409 => Self::Conflict(message),
            412 => Self::Precondition(message),
            429 => Self::RateLimited(message),
            500..=599 => Self::Unavailable(message),
            _ => Self::Status { status, message },
        }
    }

    /// Returns `true` if the service reported the entity as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<ClientError> for stowage_core::Error {
    fn from(err: ClientError) -> Self {
        stowage_core::Error::backend()
            .with_message(err.to_string())
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use stowage_core::ErrorKind;

    use super::*;

    #[test]
    fn test_from_status() {
        assert!(ClientError::from_status(404, "gone").is_not_found());
        assert!(matches!(
            ClientError::from_status(403, "no"),
            ClientError::PermissionDenied(_)
        ));
        assert!(matches!(
            ClientError::from_status(409, "exists"),
            ClientError::Conflict(_)
        ));
        assert!(matches!(
            ClientError::from_status(503, "later"),
            ClientError::Unavailable(_)
        ));
        assert!(matches!(
            ClientError::from_status(418, "teapot"),
            ClientError::Status { status: 418, .. }
        ));
    }

    #[test]
    fn test_into_core_error_is_backend() {
        let err: stowage_core::Error = ClientError::conflict("bucket 'b1' exists").into();

        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.to_string().contains("b1"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_not_found_stays_backend_until_normalized() {
        let err: stowage_core::Error = ClientError::not_found("object 'x'").into();
        assert_eq!(err.kind(), ErrorKind::Backend);

        let err = err.into_not_found("item 'x' not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
