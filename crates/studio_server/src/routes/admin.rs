//! Admin review of subscription requests.

use crate::ApiState;
use crate::auth::AdminGuard;
use crate::error::ApiResult;
use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use studio_core::SubscriptionRequest;
use tracing::info;

/// Optional body of the deny route.
#[derive(Debug, Default, Deserialize)]
pub struct DenyBody {
    /// Reason shown in the logs
    #[serde(default)]
    pub reason: Option<String>,
}

/// Outcome of a review.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub message: String,
    pub request: SubscriptionRequest,
}

/// `GET /admin/subscription-requests`
pub async fn list_requests(
    _guard: AdminGuard,
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<SubscriptionRequest>>> {
    Ok(Json(state.ledger().list_pending().await?))
}

/// `POST /admin/subscription-requests/{payment_id}/approve`
pub async fn approve_request(
    _guard: AdminGuard,
    State(state): State<ApiState>,
    Path(payment_id): Path<i32>,
) -> ApiResult<Json<ReviewResponse>> {
    let request = state.ledger().approve(payment_id).await?;
    info!(payment_id, email = %request.account_email, "Subscription approved");

    Ok(Json(ReviewResponse {
        message: format!("{} upgraded to the paid plan", request.account_email),
        request,
    }))
}

/// `POST /admin/subscription-requests/{payment_id}/deny`
pub async fn deny_request(
    _guard: AdminGuard,
    State(state): State<ApiState>,
    Path(payment_id): Path<i32>,
    body: Option<Json<DenyBody>>,
) -> ApiResult<Json<ReviewResponse>> {
    let reason = body.and_then(|Json(b)| b.reason);
    let request = state.ledger().deny(payment_id).await?;
    info!(
        payment_id,
        email = %request.account_email,
        reason = reason.as_deref().unwrap_or("none given"),
        "Subscription denied"
    );

    Ok(Json(ReviewResponse {
        message: format!("Subscription request {payment_id} denied"),
        request,
    }))
}
