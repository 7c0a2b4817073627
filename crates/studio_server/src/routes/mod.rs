//! HTTP routes.

mod account;
mod admin;
mod payments;
mod tts;

pub use account::MeResponse;
pub use admin::{DenyBody, ReviewResponse};
pub use payments::{SubscriptionRequestBody, SubscriptionRequestResponse};
pub use tts::{GenerateVoiceRequest, GenerateVoiceResponse, PlanInfoResponse, QuotaDenialResponse};

use crate::ApiState;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Build the CORS layer for `origins`. Invalid origins are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(crate::auth::ADMIN_KEY_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Creates the API router.
pub fn create_router(state: ApiState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/me", get(account::me))
        .route("/tts/generate-voice", post(tts::generate_voice))
        .route("/tts/plan", get(tts::plan_info))
        .route("/tts/history", get(tts::history))
        .route(
            "/payments/subscription-request",
            post(payments::subscription_request),
        )
        .route("/payments/history", get(payments::payment_history))
        .route("/admin/subscription-requests", get(admin::list_requests))
        .route(
            "/admin/subscription-requests/:payment_id/approve",
            post(admin::approve_request),
        )
        .route(
            "/admin/subscription-requests/:payment_id/deny",
            post(admin::deny_request),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
