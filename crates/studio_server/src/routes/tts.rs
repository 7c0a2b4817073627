//! Voice generation, plan info and history.

use crate::ApiState;
use crate::auth::CurrentAccount;
use crate::error::ApiResult;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use studio_core::{Plan, VoiceHistoryEntry};
use studio_error::{ServerError, ServerErrorKind};
use studio_quota::{DenialReason, QuotaOutcome, QuotaReport};
use tracing::{info, instrument, warn};

/// Body of `POST /tts/generate-voice`.
#[derive(Debug, Deserialize)]
pub struct GenerateVoiceRequest {
    /// Text to synthesize
    pub text: String,
}

/// Successful generation.
#[derive(Debug, Serialize)]
pub struct GenerateVoiceResponse {
    pub success: bool,
    pub message: String,
    /// Base64-encoded audio
    pub audio_data: String,
    pub words: u32,
    pub tokens_used: u32,
    pub tokens_remaining: u32,
    pub daily_count: u32,
    pub limit_reached: bool,
}

/// Refused generation.
#[derive(Debug, Serialize)]
pub struct QuotaDenialResponse {
    pub success: bool,
    pub error_type: DenialReason,
    pub message: String,
    pub tokens_used: u32,
    pub tokens_remaining: u32,
    pub daily_count: u32,
    pub limit_reached: bool,
}

fn denial_status(reason: DenialReason) -> StatusCode {
    match reason {
        DenialReason::WordLimitExceeded => StatusCode::BAD_REQUEST,
        DenialReason::TokenLimitExceeded | DenialReason::DailyLimitExceeded => {
            StatusCode::TOO_MANY_REQUESTS
        }
    }
}

fn denial_response(report: &QuotaReport, reason: DenialReason) -> Response {
    let body = QuotaDenialResponse {
        success: false,
        error_type: reason,
        message: reason.message(&report.policy),
        tokens_used: report.tokens_used(),
        tokens_remaining: report.tokens_remaining(),
        daily_count: report.daily_count(),
        limit_reached: report.limit_reached(),
    };
    (denial_status(reason), Json(body)).into_response()
}

/// `POST /tts/generate-voice`
#[instrument(skip_all)]
pub async fn generate_voice(
    State(state): State<ApiState>,
    CurrentAccount(account): CurrentAccount,
    Json(request): Json<GenerateVoiceRequest>,
) -> ApiResult<Response> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ServerError::new(ServerErrorKind::BadRequest(
            "Text is required for voice generation".to_string(),
        ))
        .into());
    }

    let permit = match state.quota().authorize(*account.id(), text).await? {
        QuotaOutcome::Permitted(permit) => permit,
        QuotaOutcome::Denied(report) => {
            let reason = report.denial.unwrap_or(DenialReason::TokenLimitExceeded);
            return Ok(denial_response(&report, reason));
        }
    };

    let audio = match state.synthesizer().synthesize(text).await {
        Ok(audio) => audio,
        Err(e) => {
            warn!(
                account = %account.id(),
                provider = state.synthesizer().provider_name(),
                error = %e,
                "Generation failed, usage not charged"
            );
            return Err(e.into());
        }
    };

    let words = permit.units();
    let report = permit.commit().await?;
    info!(account = %account.id(), words, tokens_used = report.tokens_used(), "Voice generated");

    Ok(Json(GenerateVoiceResponse {
        success: true,
        message: format!("Voice generated successfully ({words} words)"),
        audio_data: STANDARD.encode(&audio),
        words,
        tokens_used: report.tokens_used(),
        tokens_remaining: report.tokens_remaining(),
        daily_count: report.daily_count(),
        limit_reached: report.limit_reached(),
    })
    .into_response())
}

/// Response of `GET /tts/plan`.
#[derive(Debug, Serialize)]
pub struct PlanInfoResponse {
    pub plan: Plan,
    pub name: String,
    pub max_words_per_request: Option<u32>,
    pub max_lifetime_tokens: u32,
    pub max_daily_generations: Option<u32>,
    pub tokens_used: u32,
    pub tokens_remaining: u32,
    pub daily_count: u32,
    pub limit_reached: bool,
    pub requested: bool,
    pub features: Vec<String>,
}

/// `GET /tts/plan`
pub async fn plan_info(
    State(state): State<ApiState>,
    CurrentAccount(account): CurrentAccount,
) -> ApiResult<Json<PlanInfoResponse>> {
    let report = state.quota().report(*account.id()).await?;
    let limit_reached = report.limit_reached();
    let tokens_used = report.tokens_used();
    let tokens_remaining = report.tokens_remaining();
    let daily_count = report.daily_count();
    let policy = report.policy;

    Ok(Json(PlanInfoResponse {
        plan: report.plan,
        name: policy.name,
        max_words_per_request: policy.max_words_per_request,
        max_lifetime_tokens: policy.max_lifetime_tokens,
        max_daily_generations: policy.max_daily_generations,
        tokens_used,
        tokens_remaining,
        daily_count,
        limit_reached,
        requested: *account.requested(),
        features: policy.features,
    }))
}

/// Query of `GET /tts/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    50
}

/// `GET /tts/history`
pub async fn history(
    State(state): State<ApiState>,
    CurrentAccount(account): CurrentAccount,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<VoiceHistoryEntry>>> {
    let limit = query.limit.clamp(1, 100);
    let entries = state.accounts().voice_history(*account.id(), limit).await?;
    Ok(Json(entries))
}
