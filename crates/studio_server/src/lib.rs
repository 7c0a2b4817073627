//! HTTP API for the Studio voice-generation service.
//!
//! Handlers sit on top of the quota engine: every generation request is
//! authorized by [`studio_quota::QuotaService`] before the speech vendor is
//! called, and usage is committed only once audio has come back.
//!
//! # Routes
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | GET | `/health` | none |
//! | GET | `/auth/me` | bearer |
//! | POST | `/tts/generate-voice` | bearer |
//! | GET | `/tts/plan` | bearer |
//! | GET | `/tts/history` | bearer |
//! | POST | `/payments/subscription-request` | bearer |
//! | GET | `/payments/history` | bearer |
//! | GET | `/admin/subscription-requests` | admin key |
//! | POST | `/admin/subscription-requests/{id}/approve` | admin key |
//! | POST | `/admin/subscription-requests/{id}/deny` | admin key |

#![forbid(unsafe_code)]

mod auth;
mod error;
mod observability;
mod routes;
mod secrets;
mod server;
mod state;
mod synth;

pub use auth::{ADMIN_KEY_HEADER, AdminGuard, AdminKey, Claims, CurrentAccount, TokenIssuer};
pub use error::{ApiError, ApiResult, ErrorBody};
pub use observability::init_logging;
pub use routes::{
    DenyBody, GenerateVoiceRequest, GenerateVoiceResponse, MeResponse, PlanInfoResponse,
    QuotaDenialResponse, ReviewResponse, SubscriptionRequestBody, SubscriptionRequestResponse,
    cors_layer, create_router,
};
pub use secrets::Secrets;
pub use server::{serve, serve_on};
pub use state::{ApiState, SharedQuota};
pub use synth::LemonfoxClient;
