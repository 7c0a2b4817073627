//! Lemonfox text-to-speech client.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use studio_error::{StudioResult, SynthesisError, SynthesisErrorKind};
use studio_interface::SpeechSynthesizer;
use studio_quota::SynthesisConfig;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// Client for the Lemonfox `/audio/speech` endpoint.
#[derive(Clone)]
pub struct LemonfoxClient {
    http: reqwest::Client,
    endpoint: String,
    voice: String,
    response_format: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for LemonfoxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemonfoxClient")
            .field("endpoint", &self.endpoint)
            .field("voice", &self.voice)
            .field("response_format", &self.response_format)
            .field("configured", &self.api_key.is_some())
            .finish()
    }
}

impl LemonfoxClient {
    /// Build a client from settings. A missing key is accepted here and
    /// reported on the first synthesis attempt.
    pub fn new(config: &SynthesisConfig, api_key: Option<String>) -> StudioResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::new(SynthesisErrorKind::Transport(e.to_string())))?;

        Ok(Self {
            http,
            endpoint: format!("{}/audio/speech", config.base_url.trim_end_matches('/')),
            voice: config.voice.clone(),
            response_format: config.response_format.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Pull the most useful message out of an error body.
///
/// Handles `{"detail": "..."}`, `{"detail": {"status": .., "message": ..}}`
/// and falls back to the raw text.
fn upstream_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    match value.get("detail") {
        Some(serde_json::Value::String(detail)) => detail.clone(),
        Some(serde_json::Value::Object(detail)) => {
            let message = detail
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or(body);
            match detail.get("status").and_then(|s| s.as_str()) {
                Some(status) if !status.is_empty() => format!("{status}: {message}"),
                _ => message.to_string(),
            }
        }
        Some(other) => other.to_string(),
        None => body.to_string(),
    }
}

fn status_error(status: StatusCode, body: &str) -> SynthesisError {
    let kind = match status {
        StatusCode::UNAUTHORIZED => SynthesisErrorKind::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => SynthesisErrorKind::RateLimited,
        StatusCode::BAD_REQUEST => SynthesisErrorKind::InvalidRequest(upstream_message(body)),
        _ => SynthesisErrorKind::Upstream {
            status: status.as_u16(),
            body: upstream_message(body),
        },
    };
    SynthesisError::new(kind)
}

#[async_trait]
impl SpeechSynthesizer for LemonfoxClient {
    #[instrument(skip(self, text), fields(chars = text.len(), voice = %self.voice))]
    async fn synthesize(&self, text: &str) -> StudioResult<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(SynthesisError::new(SynthesisErrorKind::EmptyText).into());
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SynthesisError::new(SynthesisErrorKind::NotConfigured))?;

        debug!(endpoint = %self.endpoint, "Sending speech request");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&SpeechRequest {
                input: text,
                voice: &self.voice,
                response_format: &self.response_format,
            })
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                };
                error!(error = %message, "Speech request failed");
                SynthesisError::new(SynthesisErrorKind::Transport(message))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Speech provider returned an error");
            return Err(status_error(status, &body).into());
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::new(SynthesisErrorKind::Transport(e.to_string())))?;
        info!(bytes = audio.len(), "Speech generated");
        Ok(audio.to_vec())
    }

    fn provider_name(&self) -> &'static str {
        "lemonfox"
    }
}
