//! Subscription requests and their admin review.
//!
//! A Free user reports an out-of-band payment; an admin then approves it (the
//! account moves to the paid plan) or denies it. The payment row carries the
//! review state: `pending` until decided, then `completed` or `failed`.

use crate::{AccountId, AccountProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studio_error::{BillingError, BillingErrorKind};

/// Payment lifecycle state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting admin review
    #[display("pending")]
    Pending,
    /// Approved, plan upgraded
    #[display("completed")]
    Completed,
    /// Denied
    #[display("failed")]
    Failed,
}

impl PaymentStatus {
    /// Parse the `payments.status` column.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// A stored payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Primary key
    pub id: i32,
    /// Paying account
    pub account: AccountId,
    /// Amount reported
    pub amount: f64,
    /// Review state
    pub status: PaymentStatus,
    /// External transaction reference
    pub transaction_id: Option<String>,
    /// Submission time
    pub created_at: DateTime<Utc>,
}

/// A payment awaiting (or past) admin review, joined with its account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// The payment under review
    pub payment: PaymentRecord,
    /// Email of the requesting account
    pub account_email: String,
    /// Name of the requesting account
    pub account_name: String,
}

impl SubscriptionRequest {
    /// Check that `profile` may submit a request for `amount` at `price`.
    ///
    /// # Errors
    ///
    /// Rejects paid accounts, accounts with a request already under review,
    /// an empty transaction reference, and any amount other than `price`.
    pub fn validate_submission(
        profile: &AccountProfile,
        transaction_id: &str,
        amount: f64,
        price: f64,
    ) -> Result<(), BillingError> {
        if profile.plan().is_paid() {
            return Err(BillingError::new(BillingErrorKind::AlreadyPaid));
        }
        if *profile.requested() {
            return Err(BillingError::new(BillingErrorKind::AlreadyRequested));
        }
        if transaction_id.trim().is_empty() {
            return Err(BillingError::new(BillingErrorKind::MissingTransaction));
        }
        if (amount - price).abs() > f64::EPSILON {
            return Err(BillingError::new(BillingErrorKind::AmountMismatch {
                expected: price,
                submitted: amount,
            }));
        }
        Ok(())
    }

    /// Mark the request approved.
    ///
    /// # Errors
    ///
    /// Fails if the request was already decided.
    pub fn approve(&mut self) -> Result<(), BillingError> {
        self.decide(PaymentStatus::Completed)
    }

    /// Mark the request denied.
    ///
    /// # Errors
    ///
    /// Fails if the request was already decided.
    pub fn deny(&mut self) -> Result<(), BillingError> {
        self.decide(PaymentStatus::Failed)
    }

    /// Whether the request still awaits review.
    pub fn is_pending(&self) -> bool {
        self.payment.status == PaymentStatus::Pending
    }

    fn decide(&mut self, outcome: PaymentStatus) -> Result<(), BillingError> {
        if !self.is_pending() {
            return Err(BillingError::new(BillingErrorKind::AlreadyDecided {
                payment_id: self.payment.id,
                status: self.payment.status.to_string(),
            }));
        }
        self.payment.status = outcome;
        Ok(())
    }
}
