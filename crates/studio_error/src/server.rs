//! Error types for the HTTP API.

/// Error kinds for request handling.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum ServerErrorKind {
    /// Missing or invalid credentials
    #[display("Could not validate credentials")]
    Unauthorized,

    /// Credentials valid but not sufficient
    #[display("Forbidden")]
    Forbidden,

    /// Malformed or rejected input: {0}
    #[display("Bad request: {}", _0)]
    BadRequest(String),

    /// Resource missing: {0}
    #[display("Not found: {}", _0)]
    NotFound(String),

    /// Request conflicts with current state: {0}
    #[display("Conflict: {}", _0)]
    Conflict(String),

    /// Unexpected failure: {0}
    #[display("Internal error: {}", _0)]
    Internal(String),
}

/// Error wrapper with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Server Error: {} at line {} in {}", kind, line, file)]
pub struct ServerError {
    /// The error kind
    pub kind: ServerErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ServerError {
    /// Create a new ServerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ServerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ServerErrorKind {
        &self.kind
    }
}
