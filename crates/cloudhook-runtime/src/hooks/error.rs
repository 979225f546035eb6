//! Classified failures of remote hook operations.

use thiserror::Error;

/// Classification of a failed remote hook call
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The hook does not exist on the server.
    #[error("not found")]
    NotFound,

    /// A hook with the same identity already exists (webhook already exists).
    #[error("conflict")]
    Conflict,

    /// The server rejected or returned a malformed payload.
    #[error("invalid payload")]
    InvalidPayload,

    /// The request exceeded the configured timeout.
    #[error("timeout")]
    Timeout,

    /// Transport failure or any unclassified server error.
    #[error("other")]
    Other,
}

/// Failure of a single remote call against one server
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} on {server}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub server: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, server: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            server: server.to_string(),
            message: message.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == RemoteErrorKind::Conflict
    }
}

/// Verb name that does not map to a remote operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerbParseError {
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

/// Path segments that cannot form an external callback URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathResolutionError {
    #[error("no path segments given")]
    Empty,

    #[error("invalid path segment {0:?}")]
    InvalidSegment(String),

    #[error("invalid base url {url}: {reason}")]
    InvalidBase { url: String, reason: String },
}
