//! Account-facing records returned by the API.

use crate::{AccountId, Plan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity and billing state of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct AccountProfile {
    /// Primary key
    id: AccountId,
    /// Display name
    name: String,
    /// Login email, unique
    email: String,
    /// Current plan tier
    plan: Plan,
    /// A subscription request is awaiting admin review
    requested: bool,
    /// Registration time
    created_at: DateTime<Utc>,
}

impl AccountProfile {
    /// Assemble a profile from stored fields.
    pub fn new(
        id: AccountId,
        name: impl Into<String>,
        email: impl Into<String>,
        plan: Plan,
        requested: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            plan,
            requested,
            created_at,
        }
    }
}

/// One successful voice generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceHistoryEntry {
    /// Primary key
    pub id: i32,
    /// Text that was synthesized
    pub text: String,
    /// Stored audio location, when kept
    pub audio_url: Option<String>,
    /// Generation time
    pub created_at: DateTime<Utc>,
}
