//! HTTP mapping of service errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use studio_error::{
    BillingErrorKind, DatabaseErrorKind, QuotaErrorKind, ServerErrorKind, StudioError,
    StudioErrorKind, SynthesisErrorKind,
};
use tracing::{debug, error};

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable explanation
    pub detail: String,
    /// Stable machine-readable code
    pub error_type: &'static str,
}

/// Handler error: a [`StudioError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(StudioError);

impl ApiError {
    /// Wrapped error.
    pub fn inner(&self) -> &StudioError {
        &self.0
    }

    /// Status code and error code for the wrapped error.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self.0.kind() {
            StudioErrorKind::Server(e) => match e.kind() {
                ServerErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
                ServerErrorKind::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                ServerErrorKind::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                ServerErrorKind::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ServerErrorKind::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
                ServerErrorKind::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            StudioErrorKind::Billing(e) => match e.kind() {
                BillingErrorKind::RequestNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                BillingErrorKind::AlreadyDecided { .. } => {
                    (StatusCode::CONFLICT, "ALREADY_DECIDED")
                }
                BillingErrorKind::AlreadyPaid => (StatusCode::BAD_REQUEST, "ALREADY_PAID"),
                BillingErrorKind::AlreadyRequested => {
                    (StatusCode::BAD_REQUEST, "ALREADY_REQUESTED")
                }
                BillingErrorKind::AmountMismatch { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_AMOUNT")
                }
                BillingErrorKind::MissingTransaction => {
                    (StatusCode::BAD_REQUEST, "MISSING_TRANSACTION")
                }
            },
            StudioErrorKind::Synthesis(e) => match e.kind() {
                SynthesisErrorKind::EmptyText => (StatusCode::BAD_REQUEST, "EMPTY_TEXT"),
                SynthesisErrorKind::NotConfigured => {
                    (StatusCode::SERVICE_UNAVAILABLE, "SYNTHESIS_UNAVAILABLE")
                }
                _ => (StatusCode::BAD_GATEWAY, "SYNTHESIS_FAILED"),
            },
            StudioErrorKind::Quota(e) => match e.kind() {
                QuotaErrorKind::AccountNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                QuotaErrorKind::CapacityConflict { .. } => {
                    (StatusCode::CONFLICT, "USAGE_CONFLICT")
                }
            },
            StudioErrorKind::Database(e) => match e.kind() {
                DatabaseErrorKind::Duplicate(_) => (StatusCode::CONFLICT, "DUPLICATE"),
                DatabaseErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            StudioErrorKind::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn detail(&self) -> String {
        match self.0.kind() {
            StudioErrorKind::Server(e) => match e.kind() {
                ServerErrorKind::BadRequest(msg)
                | ServerErrorKind::NotFound(msg)
                | ServerErrorKind::Conflict(msg) => msg.clone(),
                kind => kind.to_string(),
            },
            StudioErrorKind::Billing(e) => e.kind().to_string(),
            StudioErrorKind::Synthesis(e) => e.kind().to_string(),
            StudioErrorKind::Quota(e) => e.kind().to_string(),
            StudioErrorKind::Database(e) => match e.kind() {
                DatabaseErrorKind::Duplicate(_) => "Record already exists".to_string(),
                DatabaseErrorKind::NotFound => "Record not found".to_string(),
                _ => "Internal server error".to_string(),
            },
            StudioErrorKind::Config(_) => "Internal server error".to_string(),
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<StudioError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.classify();
        if status.is_server_error() {
            error!(error = %self.0, status = status.as_u16(), "Request failed");
        } else {
            debug!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            detail: self.detail(),
            error_type,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
