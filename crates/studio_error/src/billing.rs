//! Subscription request and admin approval error types.

/// Reasons a subscription request or its review cannot proceed.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum BillingErrorKind {
    /// The account is already on the paid plan
    #[display("You already have a paid plan")]
    AlreadyPaid,
    /// A request from this account is still awaiting review
    #[display("You have already submitted a subscription request")]
    AlreadyRequested,
    /// Submitted amount differs from the subscription price
    #[display("Invalid amount {}. Please pay exactly {}", submitted, expected)]
    AmountMismatch {
        /// Configured subscription price
        expected: f64,
        /// Amount the user reported paying
        submitted: f64,
    },
    /// Transaction reference missing
    #[display("A transaction id is required")]
    MissingTransaction,
    /// No subscription request with this payment id
    #[display("Subscription request {} not found", _0)]
    RequestNotFound(i32),
    /// Request was already approved or denied
    #[display("Subscription request {} is already {}", payment_id, status)]
    AlreadyDecided {
        /// Payment row backing the request
        payment_id: i32,
        /// Current status of that payment
        status: String,
    },
}

/// Billing error with source location tracking.
///
/// # Examples
///
/// ```
/// use studio_error::{BillingError, BillingErrorKind};
///
/// let err = BillingError::new(BillingErrorKind::AlreadyPaid);
/// assert!(err.to_string().contains("paid plan"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Billing Error: {} at line {} in {}", kind, line, file)]
pub struct BillingError {
    /// The kind of error that occurred
    pub kind: BillingErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl BillingError {
    /// Create a new BillingError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BillingErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BillingErrorKind {
        &self.kind
    }
}
