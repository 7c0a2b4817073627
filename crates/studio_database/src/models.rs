//! Diesel row types and their conversion into core records.

use crate::DatabaseResult;
use crate::schema::{payments, users, voice_history};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use studio_core::{
    AccountId, AccountProfile, AccountUsage, PaymentRecord, PaymentStatus, Plan,
    SubscriptionRequest, VoiceHistoryEntry,
};
use studio_error::{DatabaseError, DatabaseErrorKind};

/// Row in `users`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub plan: String,
    pub daily_voice_count: i32,
    pub last_reset_date: Option<NaiveDate>,
    pub total_tokens_used: i32,
    pub requested: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable row for `users`. Counters and plan take their column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

/// Counter columns written by a usage commit.
#[derive(Debug, Clone, Copy, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub struct UsageChangeset {
    pub daily_voice_count: i32,
    pub last_reset_date: Option<NaiveDate>,
    pub total_tokens_used: i32,
}

impl UsageChangeset {
    /// Columns for `usage`, saturating at `i32::MAX`.
    pub fn from_usage(usage: &AccountUsage) -> Self {
        Self {
            daily_voice_count: to_column(usage.daily_generation_count),
            last_reset_date: usage.last_reset_date,
            total_tokens_used: to_column(usage.lifetime_tokens_used),
        }
    }
}

fn to_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn from_column(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

impl UserRow {
    /// Typed account id.
    pub fn account_id(&self) -> AccountId {
        AccountId(self.id)
    }

    /// Parsed plan column.
    pub fn plan(&self) -> DatabaseResult<Plan> {
        Plan::parse(&self.plan).ok_or_else(|| {
            DatabaseError::new(DatabaseErrorKind::Query(format!(
                "user {} has unknown plan '{}'",
                self.id, self.plan
            )))
        })
    }

    /// Quota-relevant columns.
    pub fn usage(&self) -> DatabaseResult<AccountUsage> {
        Ok(AccountUsage {
            plan: self.plan()?,
            lifetime_tokens_used: from_column(self.total_tokens_used),
            daily_generation_count: from_column(self.daily_voice_count),
            last_reset_date: self.last_reset_date,
        })
    }

    /// Identity and billing columns.
    pub fn profile(&self) -> DatabaseResult<AccountProfile> {
        Ok(AccountProfile::new(
            self.account_id(),
            self.name.clone(),
            self.email.clone(),
            self.plan()?,
            self.requested,
            self.created_at,
        ))
    }
}

/// Row in `voice_history`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = voice_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VoiceHistoryRow {
    pub id: i32,
    pub user_id: i32,
    pub text: String,
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable row for `voice_history`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = voice_history)]
pub struct NewVoiceHistoryRow<'a> {
    pub user_id: i32,
    pub text: &'a str,
    pub audio_url: Option<&'a str>,
}

impl From<VoiceHistoryRow> for VoiceHistoryEntry {
    fn from(row: VoiceHistoryRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            audio_url: row.audio_url,
            created_at: row.created_at,
        }
    }
}

/// Row in `payments`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentRow {
    pub id: i32,
    pub user_id: i32,
    pub amount: f64,
    pub status: String,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable row for `payments`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct NewPaymentRow<'a> {
    pub user_id: i32,
    pub amount: f64,
    pub status: &'a str,
    pub transaction_id: Option<&'a str>,
}

impl PaymentRow {
    /// Convert into the core record.
    pub fn into_record(self) -> DatabaseResult<PaymentRecord> {
        let status = PaymentStatus::parse(&self.status).ok_or_else(|| {
            DatabaseError::new(DatabaseErrorKind::Query(format!(
                "payment {} has unknown status '{}'",
                self.id, self.status
            )))
        })?;
        Ok(PaymentRecord {
            id: self.id,
            account: AccountId(self.user_id),
            amount: self.amount,
            status,
            transaction_id: self.transaction_id,
            created_at: self.created_at,
        })
    }

    /// Join with the owning user into a review item.
    pub fn into_request(self, user: UserRow) -> DatabaseResult<SubscriptionRequest> {
        Ok(SubscriptionRequest {
            payment: self.into_record()?,
            account_email: user.email,
            account_name: user.name,
        })
    }
}
