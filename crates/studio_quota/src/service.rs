//! Quota service: decision, permit, commit.
//!
//! [`QuotaService::authorize`] serializes requests per account. The returned
//! [`UsagePermit`] holds the account lock until it is committed or dropped, so
//! two requests from the same account never interleave between the decision
//! and the charge. The store recheck covers writers outside this process.

use crate::{Decision, DenialReason, Evaluation, PlanPolicy, PolicyTable, evaluate};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use studio_core::{AccountId, AccountUsage, Clock, Plan, UsageCharge, count_words};
use studio_error::StudioResult;
use studio_interface::UsageStore;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};

/// Lock map entries are pruned once the map grows past this many accounts.
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// Usage snapshot of one account against its plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaReport {
    /// Account the report describes
    pub account: AccountId,
    /// Plan the figures were evaluated under
    pub plan: Plan,
    /// Counters (rollover applied)
    pub usage: AccountUsage,
    /// Policy of the plan
    pub policy: PlanPolicy,
    /// Reason the last request was refused, if it was
    pub denial: Option<DenialReason>,
}

impl QuotaReport {
    fn new(account: AccountId, usage: AccountUsage, policy: &PlanPolicy) -> Self {
        Self {
            account,
            plan: usage.plan,
            usage,
            policy: policy.clone(),
            denial: None,
        }
    }

    /// Lifetime tokens spent.
    pub fn tokens_used(&self) -> u32 {
        self.usage.lifetime_tokens_used
    }

    /// Lifetime tokens left, clamped at zero.
    pub fn tokens_remaining(&self) -> u32 {
        self.policy.remaining_tokens(self.usage.lifetime_tokens_used)
    }

    /// Generations counted today.
    pub fn daily_count(&self) -> u32 {
        self.usage.daily_generation_count
    }

    /// Whether a cap has been hit.
    pub fn limit_reached(&self) -> bool {
        match self.denial {
            Some(reason) => reason.limit_reached(),
            None => {
                self.policy.is_exhausted(self.usage.lifetime_tokens_used)
                    || self
                        .policy
                        .max_daily_generations
                        .is_some_and(|cap| self.usage.daily_generation_count >= cap)
            }
        }
    }
}

/// Result of [`QuotaService::authorize`].
pub enum QuotaOutcome<S: UsageStore + ?Sized> {
    /// Request may proceed; charge it with [`UsagePermit::commit`]
    Permitted(UsagePermit<S>),
    /// Request refused
    Denied(QuotaReport),
}

impl<S: UsageStore + ?Sized> std::fmt::Debug for QuotaOutcome<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permitted(permit) => f.debug_tuple("Permitted").field(permit).finish(),
            Self::Denied(report) => f.debug_tuple("Denied").field(report).finish(),
        }
    }
}

/// Right to charge one permitted generation.
///
/// Holds the account lock. Dropping it without committing charges nothing.
pub struct UsagePermit<S: UsageStore + ?Sized> {
    store: Arc<S>,
    account: AccountId,
    policy: PlanPolicy,
    evaluation: Evaluation,
    charge: UsageCharge,
    _guard: OwnedMutexGuard<()>,
}

impl<S: UsageStore + ?Sized> std::fmt::Debug for UsagePermit<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsagePermit")
            .field("account", &self.account)
            .field("units", &self.charge.units)
            .field("evaluation", &self.evaluation)
            .finish()
    }
}

impl<S: UsageStore + ?Sized> UsagePermit<S> {
    /// Account the permit was issued for.
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// Words the permit will charge.
    pub fn units(&self) -> u32 {
        self.charge.units
    }

    /// Decision the permit was issued under.
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    /// Counters expected after a successful commit.
    pub fn projected(&self) -> QuotaReport {
        QuotaReport::new(self.account, self.evaluation.projected(), &self.policy)
    }

    /// Charge the account. Call only after the generation succeeded.
    #[instrument(skip(self), fields(account = %self.account, units = self.charge.units))]
    pub async fn commit(self) -> StudioResult<QuotaReport> {
        let updated = self.store.commit_usage(self.account, &self.charge).await?;
        info!(
            tokens_used = updated.lifetime_tokens_used,
            daily_count = updated.daily_generation_count,
            "Generation charged"
        );
        Ok(QuotaReport::new(self.account, updated, &self.policy))
    }
}

/// Plan-limit gate in front of a [`UsageStore`].
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use std::sync::Arc;
/// use studio_core::{AccountId, AccountUsage, FixedClock};
/// use studio_quota::{MemoryUsageStore, PolicyTable, QuotaOutcome, QuotaService};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryUsageStore::new());
/// store.insert(AccountId(1), AccountUsage::new_free());
/// let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
/// let quota = QuotaService::new(store, PolicyTable::default(), clock);
///
/// match quota.authorize(AccountId(1), "hello world").await? {
///     QuotaOutcome::Permitted(permit) => {
///         let report = permit.commit().await?;
///         assert_eq!(report.tokens_used(), 2);
///     }
///     QuotaOutcome::Denied(report) => panic!("denied: {:?}", report.denial),
/// }
/// # Ok(())
/// # }
/// ```
pub struct QuotaService<S: UsageStore + ?Sized> {
    store: Arc<S>,
    policies: PolicyTable,
    clock: Arc<dyn Clock>,
    locks: Mutex<HashMap<AccountId, Arc<AsyncMutex<()>>>>,
}

impl<S: UsageStore + ?Sized> QuotaService<S> {
    /// Create a service over `store`.
    pub fn new(store: Arc<S>, policies: PolicyTable, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policies,
            clock,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Policy table in force.
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn account_lock(&self, account: AccountId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock();
        if locks.len() > LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks.entry(account).or_default().clone()
    }

    /// Decide whether `text` may be generated for `account`.
    ///
    /// The daily rollover is persisted whenever one happened, even when the
    /// request is refused.
    #[instrument(skip(self, text), fields(account = %account))]
    pub async fn authorize(&self, account: AccountId, text: &str) -> StudioResult<QuotaOutcome<S>> {
        let units = count_words(text);
        let guard = self.account_lock(account).lock_owned().await;

        let today = self.clock.today();
        let usage = self.store.load(account).await?;
        let policy = self.policies.for_plan(usage.plan);
        let evaluation = evaluate(&usage, policy, today, units);

        if evaluation.rollover {
            debug!(%today, "Applying daily rollover");
            self.store.persist_rollover(account, today).await?;
        }

        match evaluation.decision {
            Decision::Denied {
                reason,
                remaining_tokens,
            } => {
                warn!(%reason, units, remaining_tokens, "Generation denied");
                let mut report = QuotaReport::new(account, evaluation.counters, policy);
                report.denial = Some(reason);
                Ok(QuotaOutcome::Denied(report))
            }
            Decision::Permitted { .. } => {
                debug!(units, "Generation permitted");
                Ok(QuotaOutcome::Permitted(UsagePermit {
                    store: Arc::clone(&self.store),
                    account,
                    policy: policy.clone(),
                    evaluation,
                    charge: UsageCharge {
                        today,
                        units,
                        max_lifetime_tokens: policy.max_lifetime_tokens,
                        request_text: Some(text.to_string()),
                    },
                    _guard: guard,
                }))
            }
        }
    }

    /// Current counters of `account` against its plan.
    ///
    /// The rollover is applied to the returned figures but not persisted.
    #[instrument(skip(self), fields(account = %account))]
    pub async fn report(&self, account: AccountId) -> StudioResult<QuotaReport> {
        let today = self.clock.today();
        let usage = self.store.load(account).await?.rolled_over(today);
        Ok(QuotaReport::new(
            account,
            usage,
            self.policies.for_plan(usage.plan),
        ))
    }
}
