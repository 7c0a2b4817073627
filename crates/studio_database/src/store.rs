//! Pool-backed implementation of the storage seams.
//!
//! Diesel is synchronous, so every call checks out a pooled connection and runs
//! on the blocking thread pool.

use crate::{
    AccountRepository, DbPool, PostgresAccountRepository, PostgresSubscriptionRepository,
    SubscriptionRepository,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use studio_core::{
    AccountId, AccountProfile, AccountUsage, PaymentRecord, SubscriptionRequest, UsageCharge,
    VoiceHistoryEntry,
};
use studio_error::{
    DatabaseError, DatabaseErrorKind, QuotaError, QuotaErrorKind, StudioError, StudioResult,
};
use studio_interface::{AccountDirectory, SubscriptionLedger, UsageStore};
use tracing::{debug, instrument};

/// Database-backed account, usage and subscription store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: DbPool,
}

impl PostgresStore {
    /// Create a store over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn with_conn<T, F>(&self, f: F) -> StudioResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> StudioResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(DatabaseError::from)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Register a Free account.
    #[instrument(skip(self, name, email))]
    pub async fn create_account(&self, name: &str, email: &str) -> StudioResult<AccountProfile> {
        let name = name.to_string();
        let email = email.to_string();
        self.with_conn(move |conn| {
            let row = PostgresAccountRepository::new(conn).create_account(&name, &email)?;
            Ok(row.profile()?)
        })
        .await
    }
}

fn not_found(account: AccountId) -> StudioError {
    QuotaError::new(QuotaErrorKind::AccountNotFound(account.get())).into()
}

#[async_trait]
impl UsageStore for PostgresStore {
    async fn load(&self, account: AccountId) -> StudioResult<AccountUsage> {
        self.with_conn(move |conn| {
            let row = PostgresAccountRepository::new(conn)
                .find_by_id(account.get())?
                .ok_or_else(|| not_found(account))?;
            Ok(row.usage()?)
        })
        .await
    }

    async fn persist_rollover(&self, account: AccountId, today: NaiveDate) -> StudioResult<()> {
        self.with_conn(move |conn| {
            let changed = PostgresAccountRepository::new(conn).store_rollover(account.get(), today)?;
            debug!(%account, changed, "Rollover stored");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, charge), fields(units = charge.units))]
    async fn commit_usage(
        &self,
        account: AccountId,
        charge: &UsageCharge,
    ) -> StudioResult<AccountUsage> {
        let charge = charge.clone();
        self.with_conn(move |conn| {
            conn.transaction(|conn| {
                let mut accounts = PostgresAccountRepository::new(conn);
                let current = accounts
                    .lock_usage(account.get())?
                    .ok_or_else(|| not_found(account))?
                    .usage()?;

                let updated = current.charged(&charge).ok_or_else(|| {
                    QuotaError::new(QuotaErrorKind::CapacityConflict {
                        account: account.get(),
                        requested: charge.units,
                        remaining: current
                            .rolled_over(charge.today)
                            .remaining_under(charge.max_lifetime_tokens),
                    })
                })?;

                accounts.store_usage(account.get(), &updated)?;
                if let Some(text) = &charge.request_text {
                    accounts.record_voice(account.get(), text)?;
                }
                Ok(updated)
            })
        })
        .await
    }
}

#[async_trait]
impl AccountDirectory for PostgresStore {
    async fn find_by_email(&self, email: &str) -> StudioResult<Option<AccountProfile>> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            PostgresAccountRepository::new(conn)
                .find_by_email(&email)?
                .map(|row| row.profile().map_err(StudioError::from))
                .transpose()
        })
        .await
    }

    async fn voice_history(
        &self,
        account: AccountId,
        limit: i64,
    ) -> StudioResult<Vec<VoiceHistoryEntry>> {
        self.with_conn(move |conn| {
            let rows = PostgresAccountRepository::new(conn).voice_history(account.get(), limit)?;
            Ok(rows.into_iter().map(VoiceHistoryEntry::from).collect())
        })
        .await
    }
}

#[async_trait]
impl SubscriptionLedger for PostgresStore {
    async fn submit_request(
        &self,
        account: AccountId,
        transaction_id: &str,
        amount: f64,
        price: f64,
    ) -> StudioResult<PaymentRecord> {
        let transaction_id = transaction_id.to_string();
        self.with_conn(move |conn| {
            PostgresSubscriptionRepository::new(conn).submit_request(
                account.get(),
                &transaction_id,
                amount,
                price,
            )
        })
        .await
    }

    async fn list_pending(&self) -> StudioResult<Vec<SubscriptionRequest>> {
        self.with_conn(|conn| PostgresSubscriptionRepository::new(conn).list_pending())
            .await
    }

    async fn approve(&self, payment_id: i32) -> StudioResult<SubscriptionRequest> {
        self.with_conn(move |conn| PostgresSubscriptionRepository::new(conn).approve(payment_id))
            .await
    }

    async fn deny(&self, payment_id: i32) -> StudioResult<SubscriptionRequest> {
        self.with_conn(move |conn| PostgresSubscriptionRepository::new(conn).deny(payment_id))
            .await
    }

    async fn payment_history(&self, account: AccountId) -> StudioResult<Vec<PaymentRecord>> {
        self.with_conn(move |conn| {
            PostgresSubscriptionRepository::new(conn).payment_history(account.get())
        })
        .await
    }
}
