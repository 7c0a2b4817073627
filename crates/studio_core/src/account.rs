//! The per-account usage record.

use crate::Plan;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Primary key of an account (`users.id`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct AccountId(pub i32);

impl AccountId {
    /// Raw database identifier.
    pub fn get(&self) -> i32 {
        self.0
    }
}

/// Quota-relevant state of one account.
///
/// `lifetime_tokens_used` only ever grows. `daily_generation_count` is only
/// meaningful for `last_reset_date`; when that date is before today the count
/// is logically zero, whether or not storage has caught up yet.
/// `last_reset_date` never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUsage {
    /// Current plan tier
    pub plan: Plan,
    /// Words generated over the account's lifetime
    pub lifetime_tokens_used: u32,
    /// Generations since `last_reset_date`
    pub daily_generation_count: u32,
    /// Date of the last daily rollover, `None` before the first generation
    pub last_reset_date: Option<NaiveDate>,
}

impl AccountUsage {
    /// State of a freshly registered account.
    pub fn new_free() -> Self {
        Self {
            plan: Plan::Free,
            lifetime_tokens_used: 0,
            daily_generation_count: 0,
            last_reset_date: None,
        }
    }

    /// Whether the daily counter belongs to a day before `today`.
    ///
    /// A counter stamped with a later day is never rolled back: a writer that
    /// saw a newer calendar day got there first.
    pub fn needs_rollover(&self, today: NaiveDate) -> bool {
        self.last_reset_date.is_none_or(|last| last < today)
    }

    /// This record with the daily rollover for `today` applied.
    ///
    /// Idempotent: rolling over twice on the same day changes nothing.
    pub fn rolled_over(self, today: NaiveDate) -> Self {
        if self.needs_rollover(today) {
            Self {
                daily_generation_count: 0,
                last_reset_date: Some(today),
                ..self
            }
        } else {
            self
        }
    }

    /// Tokens left under `cap`, clamped at zero.
    pub fn remaining_under(&self, cap: u32) -> u32 {
        cap.saturating_sub(self.lifetime_tokens_used)
    }

    /// This record with `charge` applied on top of its rollover.
    ///
    /// When the stored counter already belongs to a later day than
    /// `charge.today`, the charge is counted against that day.
    ///
    /// Returns `None` when the charge would push the lifetime counter past
    /// `charge.max_lifetime_tokens`.
    pub fn charged(self, charge: &UsageCharge) -> Option<Self> {
        let rolled = self.rolled_over(charge.today);
        let lifetime = rolled.lifetime_tokens_used.checked_add(charge.units)?;
        if lifetime > charge.max_lifetime_tokens {
            return None;
        }
        Some(Self {
            lifetime_tokens_used: lifetime,
            daily_generation_count: rolled.daily_generation_count.saturating_add(1),
            ..rolled
        })
    }
}

impl Default for AccountUsage {
    fn default() -> Self {
        Self::new_free()
    }
}

/// A permitted unit of work to be charged to an account.
///
/// `max_lifetime_tokens` is the cap the permit was granted under; stores
/// recheck it at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCharge {
    /// Calendar day the charge belongs to
    pub today: NaiveDate,
    /// Words to add to the lifetime counter
    pub units: u32,
    /// Plan cap the decision was made under
    pub max_lifetime_tokens: u32,
    /// Request text to keep in the voice history, if any
    pub request_text: Option<String>,
}
