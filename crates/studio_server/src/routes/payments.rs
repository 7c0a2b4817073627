//! Subscription requests from users.

use crate::ApiState;
use crate::auth::CurrentAccount;
use crate::error::ApiResult;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use studio_core::PaymentRecord;
use tracing::info;

/// Body of `POST /payments/subscription-request`.
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequestBody {
    /// Reference of the out-of-band payment
    pub transaction_id: String,
    /// Amount paid
    pub amount: f64,
}

/// Accepted subscription request.
#[derive(Debug, Serialize)]
pub struct SubscriptionRequestResponse {
    pub message: String,
    pub payment: PaymentRecord,
}

/// `POST /payments/subscription-request`
pub async fn subscription_request(
    State(state): State<ApiState>,
    CurrentAccount(account): CurrentAccount,
    Json(body): Json<SubscriptionRequestBody>,
) -> ApiResult<(StatusCode, Json<SubscriptionRequestResponse>)> {
    let payment = state
        .ledger()
        .submit_request(
            *account.id(),
            &body.transaction_id,
            body.amount,
            state.subscription().price,
        )
        .await?;

    info!(account = %account.id(), payment_id = payment.id, "Subscription requested");
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionRequestResponse {
            message: "Subscription request submitted. An admin will review it shortly."
                .to_string(),
            payment,
        }),
    ))
}

/// `GET /payments/history`
pub async fn payment_history(
    State(state): State<ApiState>,
    CurrentAccount(account): CurrentAccount,
) -> ApiResult<Json<Vec<PaymentRecord>>> {
    let payments = state.ledger().payment_history(*account.id()).await?;
    Ok(Json(payments))
}
