//! Plan tiers.

use serde::{Deserialize, Serialize};

/// Subscription tier of an account.
///
/// Stored as `"Free"` / `"Paid"` in the `users.plan` column.
///
/// # Examples
///
/// ```
/// use studio_core::Plan;
///
/// assert_eq!(Plan::parse("Paid"), Some(Plan::Paid));
/// assert_eq!(Plan::Free.to_string(), "Free");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Plan {
    /// Trial tier assigned at registration
    #[default]
    #[display("Free")]
    Free,
    /// Tier granted by an approved subscription request
    #[display("Paid")]
    Paid,
}

impl Plan {
    /// Parse the storage representation. Matching is case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Plan::Free),
            "paid" => Some(Plan::Paid),
            _ => None,
        }
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Paid => "Paid",
        }
    }

    /// True for the paid tier.
    pub fn is_paid(&self) -> bool {
        matches!(self, Plan::Paid)
    }
}
