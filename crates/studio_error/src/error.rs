//! Top-level error wrapper types.

use crate::{BillingError, ConfigError, DatabaseError, QuotaError, ServerError, SynthesisError};

/// Every failure a Studio operation can surface.
///
/// # Examples
///
/// ```
/// use studio_error::{StudioError, QuotaError, QuotaErrorKind};
///
/// let err: StudioError = QuotaError::new(QuotaErrorKind::AccountNotFound(3)).into();
/// assert!(format!("{}", err).contains("Account 3"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StudioErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Database error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Usage store / quota bookkeeping error
    #[from(QuotaError)]
    Quota(QuotaError),
    /// Text-to-speech vendor error
    #[from(SynthesisError)]
    Synthesis(SynthesisError),
    /// Subscription request / approval error
    #[from(BillingError)]
    Billing(BillingError),
    /// HTTP request handling error
    #[from(ServerError)]
    Server(ServerError),
}

/// Studio error with kind discrimination.
///
/// # Examples
///
/// ```
/// use studio_error::{ConfigError, StudioResult};
///
/// fn might_fail() -> StudioResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Studio Error: {}", _0)]
pub struct StudioError(Box<StudioErrorKind>);

impl StudioError {
    /// Create a new error from a kind.
    pub fn new(kind: StudioErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StudioErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to StudioErrorKind
impl<T> From<T> for StudioError
where
    T: Into<StudioErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Studio operations.
pub type StudioResult<T> = std::result::Result<T, StudioError>;
