//! In-process usage store.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::HashMap;
use studio_core::{AccountId, AccountUsage, Plan, UsageCharge};
use studio_error::{QuotaError, QuotaErrorKind, StudioResult};
use studio_interface::UsageStore;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<AccountId, AccountUsage>,
    history: HashMap<AccountId, Vec<String>>,
}

/// [`UsageStore`] kept in memory behind a single lock.
///
/// Used by tests and local development. Commits follow the same contract as
/// the database store: rollover, cap recheck, then write.
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    inner: Mutex<Inner>,
}

impl MemoryUsageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account record.
    pub fn insert(&self, account: AccountId, usage: AccountUsage) {
        self.inner.lock().accounts.insert(account, usage);
    }

    /// Current stored record.
    pub fn get(&self, account: AccountId) -> Option<AccountUsage> {
        self.inner.lock().accounts.get(&account).copied()
    }

    /// Move an account to another plan.
    pub fn set_plan(&self, account: AccountId, plan: Plan) -> StudioResult<()> {
        let mut inner = self.inner.lock();
        let usage = inner
            .accounts
            .get_mut(&account)
            .ok_or_else(|| QuotaError::new(QuotaErrorKind::AccountNotFound(account.get())))?;
        usage.plan = plan;
        Ok(())
    }

    /// Request texts recorded for an account, oldest first.
    pub fn history(&self, account: AccountId) -> Vec<String> {
        self.inner
            .lock()
            .history
            .get(&account)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn load(&self, account: AccountId) -> StudioResult<AccountUsage> {
        self.get(account)
            .ok_or_else(|| QuotaError::new(QuotaErrorKind::AccountNotFound(account.get())).into())
    }

    async fn persist_rollover(&self, account: AccountId, today: NaiveDate) -> StudioResult<()> {
        let mut inner = self.inner.lock();
        let usage = inner
            .accounts
            .get_mut(&account)
            .ok_or_else(|| QuotaError::new(QuotaErrorKind::AccountNotFound(account.get())))?;
        *usage = usage.rolled_over(today);
        Ok(())
    }

    #[instrument(skip(self, charge), fields(units = charge.units))]
    async fn commit_usage(
        &self,
        account: AccountId,
        charge: &UsageCharge,
    ) -> StudioResult<AccountUsage> {
        let mut inner = self.inner.lock();
        let current = *inner
            .accounts
            .get(&account)
            .ok_or_else(|| QuotaError::new(QuotaErrorKind::AccountNotFound(account.get())))?;

        let updated = current.charged(charge).ok_or_else(|| {
            QuotaError::new(QuotaErrorKind::CapacityConflict {
                account: account.get(),
                requested: charge.units,
                remaining: current
                    .rolled_over(charge.today)
                    .remaining_under(charge.max_lifetime_tokens),
            })
        })?;

        inner.accounts.insert(account, updated);
        if let Some(text) = &charge.request_text {
            inner
                .history
                .entry(account)
                .or_default()
                .push(text.clone());
        }

        debug!(
            tokens_used = updated.lifetime_tokens_used,
            daily_count = updated.daily_generation_count,
            "Usage committed"
        );
        Ok(updated)
    }
}
