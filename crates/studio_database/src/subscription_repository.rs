//! Repository for subscription requests and their review.

use crate::{
    AccountRepository, NewPaymentRow, PaymentRow, PostgresAccountRepository, UserRow,
};
use diesel::prelude::*;
use studio_core::{PaymentRecord, PaymentStatus, Plan, SubscriptionRequest};
use studio_error::{BillingError, BillingErrorKind, QuotaError, QuotaErrorKind, StudioResult};
use tracing::{info, instrument};

/// Subscription request workflow over a borrowed connection.
///
/// Every state change runs in its own transaction with the affected rows locked.
pub trait SubscriptionRepository {
    /// Record a pending payment and flag the account as requested.
    fn submit_request(
        &mut self,
        user_id: i32,
        transaction_id: &str,
        amount: f64,
        price: f64,
    ) -> StudioResult<PaymentRecord>;

    /// Pending requests, oldest first.
    fn list_pending(&mut self) -> StudioResult<Vec<SubscriptionRequest>>;

    /// Complete the payment and upgrade the account to the paid plan.
    fn approve(&mut self, payment_id: i32) -> StudioResult<SubscriptionRequest>;

    /// Fail the payment and clear the account's request flag.
    fn deny(&mut self, payment_id: i32) -> StudioResult<SubscriptionRequest>;

    /// All payments of an account, newest first.
    fn payment_history(&mut self, user_id: i32) -> StudioResult<Vec<PaymentRecord>>;
}

/// PostgreSQL implementation of [`SubscriptionRepository`].
pub struct PostgresSubscriptionRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> PostgresSubscriptionRepository<'a> {
    /// Create a repository over a mutable connection reference.
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }
}

/// Lock a payment and its owner, then apply `decide` to the joined request.
fn review(
    conn: &mut PgConnection,
    payment_id: i32,
    decide: impl FnOnce(&mut SubscriptionRequest) -> Result<(), BillingError>,
) -> StudioResult<(SubscriptionRequest, i32)> {
    use crate::schema::payments;

    let payment: PaymentRow = payments::table
        .find(payment_id)
        .select(PaymentRow::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or_else(|| BillingError::new(BillingErrorKind::RequestNotFound(payment_id)))?;

    let user_id = payment.user_id;
    let user: UserRow = PostgresAccountRepository::new(conn)
        .lock_usage(user_id)?
        .ok_or_else(|| QuotaError::new(QuotaErrorKind::AccountNotFound(user_id)))?;

    let mut request = payment.into_request(user)?;
    decide(&mut request)?;

    diesel::update(payments::table.find(payment_id))
        .set(payments::status.eq(request.payment.status.as_str()))
        .execute(conn)?;

    Ok((request, user_id))
}

impl SubscriptionRepository for PostgresSubscriptionRepository<'_> {
    #[instrument(skip(self, transaction_id))]
    fn submit_request(
        &mut self,
        user_id: i32,
        transaction_id: &str,
        amount: f64,
        price: f64,
    ) -> StudioResult<PaymentRecord> {
        use crate::schema::payments;

        self.conn.transaction(|conn| {
            let mut accounts = PostgresAccountRepository::new(conn);
            let user = accounts
                .lock_usage(user_id)?
                .ok_or_else(|| QuotaError::new(QuotaErrorKind::AccountNotFound(user_id)))?;
            SubscriptionRequest::validate_submission(
                &user.profile()?,
                transaction_id,
                amount,
                price,
            )?;
            accounts.set_requested(user_id, true)?;

            let row: PaymentRow = diesel::insert_into(payments::table)
                .values(&NewPaymentRow {
                    user_id,
                    amount,
                    status: PaymentStatus::Pending.as_str(),
                    transaction_id: Some(transaction_id.trim()),
                })
                .returning(PaymentRow::as_returning())
                .get_result(conn)?;

            info!(payment_id = row.id, "Subscription request recorded");
            Ok(row.into_record()?)
        })
    }

    fn list_pending(&mut self) -> StudioResult<Vec<SubscriptionRequest>> {
        use crate::schema::{payments, users};

        let rows: Vec<(PaymentRow, UserRow)> = payments::table
            .inner_join(users::table)
            .filter(payments::status.eq(PaymentStatus::Pending.as_str()))
            .order((payments::created_at.asc(), payments::id.asc()))
            .select((PaymentRow::as_select(), UserRow::as_select()))
            .load(self.conn)?;

        rows.into_iter()
            .map(|(payment, user)| payment.into_request(user).map_err(Into::into))
            .collect()
    }

    #[instrument(skip(self))]
    fn approve(&mut self, payment_id: i32) -> StudioResult<SubscriptionRequest> {
        self.conn.transaction(|conn| {
            let (request, user_id) = review(conn, payment_id, SubscriptionRequest::approve)?;
            PostgresAccountRepository::new(conn).upgrade_plan(user_id, Plan::Paid)?;
            info!(user_id, "Subscription approved, account upgraded");
            Ok(request)
        })
    }

    #[instrument(skip(self))]
    fn deny(&mut self, payment_id: i32) -> StudioResult<SubscriptionRequest> {
        self.conn.transaction(|conn| {
            let (request, user_id) = review(conn, payment_id, SubscriptionRequest::deny)?;
            PostgresAccountRepository::new(conn).set_requested(user_id, false)?;
            info!(user_id, "Subscription denied");
            Ok(request)
        })
    }

    fn payment_history(&mut self, owner: i32) -> StudioResult<Vec<PaymentRecord>> {
        use crate::schema::payments::dsl::*;

        let rows: Vec<PaymentRow> = payments
            .filter(user_id.eq(owner))
            .order((created_at.desc(), id.desc()))
            .select(PaymentRow::as_select())
            .load(self.conn)?;

        rows.into_iter()
            .map(|row| row.into_record().map_err(Into::into))
            .collect()
    }
}
