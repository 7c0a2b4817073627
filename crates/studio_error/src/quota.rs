//! Quota bookkeeping error types.
//!
//! These cover failures of the usage store, never plan-limit denials.

/// Quota bookkeeping error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum QuotaErrorKind {
    /// No account record exists for the identifier
    #[display("Account {} not found", _0)]
    AccountNotFound(i32),

    /// The commit-time recheck found less lifetime headroom than the permit assumed
    #[display(
        "Usage commit for account {} rejected: requested {} tokens, {} remaining",
        account,
        requested,
        remaining
    )]
    CapacityConflict {
        /// Account being charged
        account: i32,
        /// Tokens the permit tried to charge
        requested: u32,
        /// Tokens actually left under the plan cap
        remaining: u32,
    },
}

/// Quota error with source location tracking.
///
/// # Examples
///
/// ```
/// use studio_error::{QuotaError, QuotaErrorKind};
///
/// let err = QuotaError::new(QuotaErrorKind::AccountNotFound(7));
/// assert!(err.to_string().contains("Account 7 not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Quota Error: {} at line {} in {}", kind, line, file)]
pub struct QuotaError {
    /// The kind of error that occurred
    pub kind: QuotaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl QuotaError {
    /// Create a new QuotaError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: QuotaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &QuotaErrorKind {
        &self.kind
    }
}
