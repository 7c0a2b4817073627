//! The authenticated caller's profile.

use crate::ApiState;
use crate::auth::CurrentAccount;
use crate::error::ApiResult;
use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use studio_core::{AccountId, Plan};

/// Response of `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub plan: Plan,
    /// Generations counted today, zero once the day has rolled over
    pub daily_voice_count: u32,
    pub tokens_used: u32,
    pub requested: bool,
    pub created_at: DateTime<Utc>,
}

/// `GET /auth/me`
pub async fn me(
    State(state): State<ApiState>,
    CurrentAccount(account): CurrentAccount,
) -> ApiResult<Json<MeResponse>> {
    let report = state.quota().report(*account.id()).await?;

    Ok(Json(MeResponse {
        id: *account.id(),
        name: account.name().clone(),
        email: account.email().clone(),
        plan: report.plan,
        daily_voice_count: report.daily_count(),
        tokens_used: report.tokens_used(),
        requested: *account.requested(),
        created_at: *account.created_at(),
    }))
}
