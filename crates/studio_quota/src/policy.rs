//! Plan policy table.
//!
//! Each plan tier maps to a [`PlanPolicy`] describing its limits. `None` on an
//! optional limit means the plan has no such cap.
//!
//! ```toml
//! [plans.free]
//! name = "Free"
//! max_words_per_request = 150
//! max_lifetime_tokens = 300
//! max_daily_generations = 2
//! ```

use serde::{Deserialize, Serialize};
use studio_core::Plan;

/// Limits that apply to every account on one plan tier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlanPolicy {
    /// Display name of the plan (e.g., "Free")
    pub name: String,

    /// Maximum words in a single generation request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_words_per_request: Option<u32>,

    /// Lifetime word allowance
    pub max_lifetime_tokens: u32,

    /// Generations allowed per calendar day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_daily_generations: Option<u32>,

    /// Marketing bullet points shown on the plan page
    #[serde(default)]
    pub features: Vec<String>,
}

impl PlanPolicy {
    /// Bundled Free tier limits.
    pub fn free() -> Self {
        Self {
            name: Plan::Free.to_string(),
            max_words_per_request: Some(150),
            max_lifetime_tokens: 300,
            max_daily_generations: Some(2),
            features: vec![
                "150 words per generation".to_string(),
                "300 lifetime tokens".to_string(),
                "2 generations per day".to_string(),
            ],
        }
    }

    /// Bundled Paid tier limits.
    pub fn paid() -> Self {
        Self {
            name: Plan::Paid.to_string(),
            max_words_per_request: None,
            max_lifetime_tokens: 800,
            max_daily_generations: Some(5),
            features: vec![
                "Unlimited words per generation".to_string(),
                "800 lifetime tokens".to_string(),
                "5 generations per day".to_string(),
                "Priority support".to_string(),
            ],
        }
    }

    /// Tokens still available after `used`, clamped at zero.
    pub fn remaining_tokens(&self, used: u32) -> u32 {
        self.max_lifetime_tokens.saturating_sub(used)
    }

    /// Whether the lifetime allowance is exhausted at `used`.
    pub fn is_exhausted(&self, used: u32) -> bool {
        used >= self.max_lifetime_tokens
    }
}

/// Plan tier to policy mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyTable {
    /// Policy for [`Plan::Free`]
    pub free: PlanPolicy,
    /// Policy for [`Plan::Paid`]
    pub paid: PlanPolicy,
}

impl PolicyTable {
    /// Policy governing accounts on `plan`.
    pub fn for_plan(&self, plan: Plan) -> &PlanPolicy {
        match plan {
            Plan::Free => &self.free,
            Plan::Paid => &self.paid,
        }
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            free: PlanPolicy::free(),
            paid: PlanPolicy::paid(),
        }
    }
}
