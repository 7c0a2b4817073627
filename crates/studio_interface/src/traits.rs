//! Storage and vendor seams.

use async_trait::async_trait;
use chrono::NaiveDate;
use studio_core::{
    AccountId, AccountProfile, AccountUsage, PaymentRecord, SubscriptionRequest, UsageCharge,
    VoiceHistoryEntry,
};
use studio_error::StudioResult;

/// Persistence boundary for account usage counters.
///
/// Implementations must make `commit_usage` atomic with respect to the account
/// row: lock, re-apply the rollover for `charge.today`, recheck the lifetime
/// cap, then write. A failed recheck must leave the record untouched.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Read the stored usage record.
    async fn load(&self, account: AccountId) -> StudioResult<AccountUsage>;

    /// Store the daily rollover for `today` (zero count, reset date = today).
    async fn persist_rollover(&self, account: AccountId, today: NaiveDate) -> StudioResult<()>;

    /// Charge a permitted, completed unit of work and return the new record.
    async fn commit_usage(
        &self,
        account: AccountId,
        charge: &UsageCharge,
    ) -> StudioResult<AccountUsage>;
}

/// Account lookup and per-account history.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Find an account by login email.
    async fn find_by_email(&self, email: &str) -> StudioResult<Option<AccountProfile>>;

    /// Most recent voice generations of an account, newest first.
    async fn voice_history(
        &self,
        account: AccountId,
        limit: i64,
    ) -> StudioResult<Vec<VoiceHistoryEntry>>;
}

/// Subscription requests and their admin review.
#[async_trait]
pub trait SubscriptionLedger: Send + Sync {
    /// Record a subscription request and flag the account as requested.
    async fn submit_request(
        &self,
        account: AccountId,
        transaction_id: &str,
        amount: f64,
        price: f64,
    ) -> StudioResult<PaymentRecord>;

    /// Requests still awaiting review, oldest first.
    async fn list_pending(&self) -> StudioResult<Vec<SubscriptionRequest>>;

    /// Approve a request: payment completed, account upgraded to the paid plan.
    async fn approve(&self, payment_id: i32) -> StudioResult<SubscriptionRequest>;

    /// Deny a request: payment failed, account may submit again.
    async fn deny(&self, payment_id: i32) -> StudioResult<SubscriptionRequest>;

    /// All payments of an account, newest first.
    async fn payment_history(&self, account: AccountId) -> StudioResult<Vec<PaymentRecord>>;
}

/// Text-to-speech vendor.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into encoded audio bytes.
    async fn synthesize(&self, text: &str) -> StudioResult<Vec<u8>>;

    /// Vendor name for logs and diagnostics.
    fn provider_name(&self) -> &'static str;
}
