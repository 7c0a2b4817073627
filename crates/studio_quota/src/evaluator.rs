//! Entitlement evaluation.
//!
//! [`evaluate`] is a pure function: it never touches storage and never fails.
//! The daily rollover is always part of its result, whether or not the request
//! is permitted, so callers can persist it unconditionally.

use crate::PlanPolicy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use studio_core::AccountUsage;

/// Why a generation request was refused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// Request text is longer than the plan allows per request
    #[display("WORD_LIMIT_EXCEEDED")]
    WordLimitExceeded,
    /// Lifetime token allowance would be exceeded
    #[display("TOKEN_LIMIT_EXCEEDED")]
    TokenLimitExceeded,
    /// Daily generation count is used up
    #[display("DAILY_LIMIT_EXCEEDED")]
    DailyLimitExceeded,
}

impl DenialReason {
    /// Wire code for the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WordLimitExceeded => "WORD_LIMIT_EXCEEDED",
            Self::TokenLimitExceeded => "TOKEN_LIMIT_EXCEEDED",
            Self::DailyLimitExceeded => "DAILY_LIMIT_EXCEEDED",
        }
    }

    /// Whether the same request can succeed later without changing it.
    ///
    /// Only the daily limit clears by itself, at the next calendar day.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DailyLimitExceeded)
    }

    /// Whether the account has hit a cap, as opposed to sending an oversized request.
    pub fn limit_reached(&self) -> bool {
        matches!(self, Self::TokenLimitExceeded | Self::DailyLimitExceeded)
    }

    /// Human-readable explanation for API payloads.
    pub fn message(&self, policy: &PlanPolicy) -> String {
        match self {
            Self::WordLimitExceeded => format!(
                "{} plan allows at most {} words per request",
                policy.name,
                policy.max_words_per_request.unwrap_or(u32::MAX)
            ),
            Self::TokenLimitExceeded => format!(
                "{} plan lifetime limit of {} tokens reached",
                policy.name, policy.max_lifetime_tokens
            ),
            Self::DailyLimitExceeded => format!(
                "{} plan allows {} generations per day, try again tomorrow",
                policy.name,
                policy.max_daily_generations.unwrap_or(u32::MAX)
            ),
        }
    }
}

/// Outcome of the limit checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Request fits; `updated` holds the counters after charging it
    Permitted {
        /// Counters after the charge
        updated: AccountUsage,
    },
    /// Request refused
    Denied {
        /// First limit that failed
        reason: DenialReason,
        /// Lifetime tokens left under the plan cap, clamped at zero
        remaining_tokens: u32,
    },
}

/// Full result of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Counters after the rollover step, before any charge
    pub counters: AccountUsage,
    /// Whether the rollover step changed the record
    pub rollover: bool,
    /// Words the request asked for
    pub requested_units: u32,
    /// Permit or deny
    pub decision: Decision,
}

impl Evaluation {
    /// Whether the request was permitted.
    pub fn is_permitted(&self) -> bool {
        matches!(self.decision, Decision::Permitted { .. })
    }

    /// Denial reason, if any.
    pub fn denial(&self) -> Option<DenialReason> {
        match self.decision {
            Decision::Denied { reason, .. } => Some(reason),
            Decision::Permitted { .. } => None,
        }
    }

    /// Counters the account will hold if the decision is committed.
    pub fn projected(&self) -> AccountUsage {
        match self.decision {
            Decision::Permitted { updated } => updated,
            Decision::Denied { .. } => self.counters,
        }
    }
}

/// Decide whether `requested_units` words may be generated for `account` today.
///
/// Checks run in a fixed order and the first failure wins: daily count, then
/// per-request words, then lifetime tokens.
pub fn evaluate(
    account: &AccountUsage,
    policy: &PlanPolicy,
    today: NaiveDate,
    requested_units: u32,
) -> Evaluation {
    let rollover = account.needs_rollover(today);
    let counters = account.rolled_over(today);
    let remaining_tokens = policy.remaining_tokens(counters.lifetime_tokens_used);

    let denied = |reason| Decision::Denied {
        reason,
        remaining_tokens,
    };

    let decision = if policy
        .max_daily_generations
        .is_some_and(|cap| counters.daily_generation_count >= cap)
    {
        denied(DenialReason::DailyLimitExceeded)
    } else if policy
        .max_words_per_request
        .is_some_and(|cap| requested_units > cap)
    {
        denied(DenialReason::WordLimitExceeded)
    } else if counters
        .lifetime_tokens_used
        .checked_add(requested_units)
        .is_none_or(|total| total > policy.max_lifetime_tokens)
    {
        denied(DenialReason::TokenLimitExceeded)
    } else {
        Decision::Permitted {
            updated: AccountUsage {
                lifetime_tokens_used: counters.lifetime_tokens_used + requested_units,
                daily_generation_count: counters.daily_generation_count.saturating_add(1),
                ..counters
            },
        }
    };

    Evaluation {
        counters,
        rollover,
        requested_units,
        decision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::Plan;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn reason_codes() {
        assert_eq!(
            DenialReason::WordLimitExceeded.to_string(),
            "WORD_LIMIT_EXCEEDED"
        );
        assert_eq!(
            serde_json_code(DenialReason::DailyLimitExceeded),
            "\"DAILY_LIMIT_EXCEEDED\""
        );
        assert!(DenialReason::DailyLimitExceeded.is_retryable());
        assert!(!DenialReason::TokenLimitExceeded.is_retryable());
        assert!(!DenialReason::WordLimitExceeded.limit_reached());
    }

    fn serde_json_code(reason: DenialReason) -> String {
        serde_json::to_string(&reason).unwrap()
    }

    #[test]
    fn daily_check_runs_before_word_check() {
        let usage = AccountUsage {
            daily_generation_count: 2,
            last_reset_date: Some(today()),
            ..AccountUsage::new_free()
        };
        let eval = evaluate(&usage, &PlanPolicy::free(), today(), 500);
        assert_eq!(eval.denial(), Some(DenialReason::DailyLimitExceeded));
    }

    #[test]
    fn no_daily_cap_means_unlimited() {
        let policy = PlanPolicy {
            max_daily_generations: None,
            ..PlanPolicy::paid()
        };
        let usage = AccountUsage {
            plan: Plan::Paid,
            daily_generation_count: 1_000,
            last_reset_date: Some(today()),
            ..AccountUsage::new_free()
        };
        let eval = evaluate(&usage, &policy, today(), 10);
        assert!(eval.is_permitted());
        assert_eq!(eval.projected().daily_generation_count, 1_001);
    }

    #[test]
    fn zero_units_are_permitted_and_counted() {
        let eval = evaluate(&AccountUsage::new_free(), &PlanPolicy::free(), today(), 0);
        let updated = eval.projected();
        assert_eq!(updated.lifetime_tokens_used, 0);
        assert_eq!(updated.daily_generation_count, 1);
    }
}
