//! Text-to-speech vendor error types.

/// Speech synthesis error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SynthesisErrorKind {
    /// API key missing from the environment
    #[display("Speech synthesis service is not configured")]
    NotConfigured,
    /// Nothing to synthesize
    #[display("Text input is required for voice generation")]
    EmptyText,
    /// Vendor rejected the API key
    #[display("Speech synthesis API key is invalid or expired")]
    Unauthorized,
    /// Vendor throttled the request
    #[display("Speech synthesis rate limit exceeded")]
    RateLimited,
    /// Vendor rejected the payload
    #[display("Invalid synthesis request: {}", _0)]
    InvalidRequest(String),
    /// Any other non-success status
    #[display("Speech synthesis failed (HTTP {}): {}", status, body)]
    Upstream {
        /// HTTP status returned by the vendor
        status: u16,
        /// Response body, truncated
        body: String,
    },
    /// Network failure or timeout
    #[display("Speech synthesis transport error: {}", _0)]
    Transport(String),
}

/// Speech synthesis error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Synthesis Error: {} at line {} in {}", kind, line, file)]
pub struct SynthesisError {
    /// The kind of error that occurred
    pub kind: SynthesisErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SynthesisError {
    /// Create a new SynthesisError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SynthesisErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SynthesisErrorKind {
        &self.kind
    }
}
