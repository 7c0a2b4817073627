//! Repository for account records and usage counters.

use crate::{
    DatabaseResult, NewUserRow, NewVoiceHistoryRow, UsageChangeset, UserRow, VoiceHistoryRow,
};
use chrono::NaiveDate;
use diesel::prelude::*;
use studio_core::{AccountUsage, Plan};

/// Account table operations over a borrowed connection.
///
/// Methods that read with `FOR UPDATE` must run inside a transaction for the
/// lock to outlive the statement.
pub trait AccountRepository {
    /// Register a Free account with zeroed counters.
    ///
    /// # Errors
    /// Returns `Duplicate` if the email is taken.
    fn create_account(&mut self, name: &str, email: &str) -> DatabaseResult<UserRow>;

    /// Look up an account by email.
    fn find_by_email(&mut self, email: &str) -> DatabaseResult<Option<UserRow>>;

    /// Look up an account by id.
    fn find_by_id(&mut self, id: i32) -> DatabaseResult<Option<UserRow>>;

    /// Read an account row and lock it until the transaction ends.
    fn lock_usage(&mut self, id: i32) -> DatabaseResult<Option<UserRow>>;

    /// Zero the daily counter if it belongs to a day before `today`.
    ///
    /// Returns the number of rows changed (0 when already rolled over).
    fn store_rollover(&mut self, id: i32, today: NaiveDate) -> DatabaseResult<usize>;

    /// Overwrite the counter columns.
    fn store_usage(&mut self, id: i32, usage: &AccountUsage) -> DatabaseResult<()>;

    /// Set the subscription-requested flag.
    fn set_requested(&mut self, id: i32, requested: bool) -> DatabaseResult<()>;

    /// Move an account to `plan`, clear the request flag and the daily count.
    fn upgrade_plan(&mut self, id: i32, plan: Plan) -> DatabaseResult<()>;

    /// Append a voice history entry.
    fn record_voice(&mut self, id: i32, text: &str) -> DatabaseResult<VoiceHistoryRow>;

    /// Most recent voice history entries, newest first.
    fn voice_history(&mut self, id: i32, limit: i64) -> DatabaseResult<Vec<VoiceHistoryRow>>;
}

/// PostgreSQL implementation of [`AccountRepository`].
pub struct PostgresAccountRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> PostgresAccountRepository<'a> {
    /// Create a repository over a mutable connection reference.
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }
}

impl AccountRepository for PostgresAccountRepository<'_> {
    fn create_account(&mut self, name: &str, email: &str) -> DatabaseResult<UserRow> {
        use crate::schema::users;

        diesel::insert_into(users::table)
            .values(&NewUserRow { name, email })
            .returning(UserRow::as_returning())
            .get_result(self.conn)
            .map_err(Into::into)
    }

    fn find_by_email(&mut self, address: &str) -> DatabaseResult<Option<UserRow>> {
        use crate::schema::users::dsl::*;

        users
            .filter(email.eq(address))
            .select(UserRow::as_select())
            .first(self.conn)
            .optional()
            .map_err(Into::into)
    }

    fn find_by_id(&mut self, user_id: i32) -> DatabaseResult<Option<UserRow>> {
        use crate::schema::users::dsl::*;

        users
            .find(user_id)
            .select(UserRow::as_select())
            .first(self.conn)
            .optional()
            .map_err(Into::into)
    }

    fn lock_usage(&mut self, user_id: i32) -> DatabaseResult<Option<UserRow>> {
        use crate::schema::users::dsl::*;

        users
            .find(user_id)
            .select(UserRow::as_select())
            .for_update()
            .first(self.conn)
            .optional()
            .map_err(Into::into)
    }

    fn store_rollover(&mut self, user_id: i32, today: NaiveDate) -> DatabaseResult<usize> {
        use crate::schema::users::dsl::*;

        diesel::update(
            users
                .find(user_id)
                .filter(last_reset_date.is_null().or(last_reset_date.lt(today))),
        )
        .set((daily_voice_count.eq(0), last_reset_date.eq(Some(today))))
        .execute(self.conn)
        .map_err(Into::into)
    }

    fn store_usage(&mut self, user_id: i32, usage: &AccountUsage) -> DatabaseResult<()> {
        use crate::schema::users::dsl::*;

        diesel::update(users.find(user_id))
            .set(&UsageChangeset::from_usage(usage))
            .execute(self.conn)?;
        Ok(())
    }

    fn set_requested(&mut self, user_id: i32, flag: bool) -> DatabaseResult<()> {
        use crate::schema::users::dsl::*;

        diesel::update(users.find(user_id))
            .set(requested.eq(flag))
            .execute(self.conn)?;
        Ok(())
    }

    fn upgrade_plan(&mut self, user_id: i32, new_plan: Plan) -> DatabaseResult<()> {
        use crate::schema::users::dsl::*;

        diesel::update(users.find(user_id))
            .set((
                plan.eq(new_plan.as_str()),
                requested.eq(false),
                daily_voice_count.eq(0),
            ))
            .execute(self.conn)?;
        Ok(())
    }

    fn record_voice(&mut self, user_id: i32, text: &str) -> DatabaseResult<VoiceHistoryRow> {
        use crate::schema::voice_history;

        diesel::insert_into(voice_history::table)
            .values(&NewVoiceHistoryRow {
                user_id,
                text,
                audio_url: None,
            })
            .returning(VoiceHistoryRow::as_returning())
            .get_result(self.conn)
            .map_err(Into::into)
    }

    fn voice_history(&mut self, owner: i32, limit: i64) -> DatabaseResult<Vec<VoiceHistoryRow>> {
        use crate::schema::voice_history::dsl::*;

        voice_history
            .filter(user_id.eq(owner))
            .order((created_at.desc(), id.desc()))
            .limit(limit)
            .select(VoiceHistoryRow::as_select())
            .load(self.conn)
            .map_err(Into::into)
    }
}
