//! Service configuration.
//!
//! This module provides TOML-based configuration for plan limits and the
//! service runtime. The configuration system supports:
//! - Bundled defaults (include_str! from studio.toml)
//! - User overrides (./studio.toml or ~/.config/studio/studio.toml)
//! - Environment overrides (`STUDIO__SERVER__BIND=...`)

use crate::{PlanPolicy, PolicyTable};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use studio_core::Plan;
use studio_error::{ConfigError, StudioError, StudioResult};
use tracing::{debug, instrument};

/// Subscription pricing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SubscriptionConfig {
    /// Exact amount a subscription request must carry
    pub price: f64,
    /// Currency code shown to users
    pub currency: String,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            price: 500.0,
            currency: "PKR".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
    /// Database connection pool size
    pub pool_size: u32,
    /// Lifetime of issued access tokens
    pub token_ttl_minutes: i64,
    /// Origins allowed by CORS; empty allows none
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            pool_size: 10,
            token_ttl_minutes: 30,
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Text-to-speech provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SynthesisConfig {
    /// Provider API root
    pub base_url: String,
    /// Voice name
    pub voice: String,
    /// Audio container (mp3, wav, ...)
    pub response_format: String,
    /// Request timeout
    pub timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lemonfox.ai/v1".to_string(),
            voice: "sarah".to_string(),
            response_format: "mp3".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level Studio configuration.
///
/// # Example
///
/// ```no_run
/// use studio_core::Plan;
/// use studio_quota::StudioConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StudioConfig::load()?;
/// let free = config.policy(Plan::Free);
/// println!("Free plan lifetime tokens: {}", free.max_lifetime_tokens);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct StudioConfig {
    /// Plan policy table
    #[serde(default)]
    pub plans: PolicyTable,

    /// Subscription pricing
    #[serde(default)]
    pub subscription: SubscriptionConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Speech provider settings
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StudioConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StudioResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StudioError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StudioError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: env > current dir > home dir > bundled.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> StudioResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled");

        const DEFAULT_CONFIG: &str = include_str!("../../../studio.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/studio/studio.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("studio").required(false))
            .add_source(
                Environment::with_prefix("STUDIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder
            .build()
            .map_err(|e| {
                StudioError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StudioError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Policy for `plan`.
    pub fn policy(&self, plan: Plan) -> &PlanPolicy {
        self.plans.for_plan(plan)
    }

    /// Reject limits that would make the service unusable.
    pub fn validate(&self) -> StudioResult<()> {
        for (plan, policy) in [("free", &self.plans.free), ("paid", &self.plans.paid)] {
            if policy.max_lifetime_tokens == 0 {
                return Err(ConfigError::for_key(
                    format!("plans.{plan}.max_lifetime_tokens"),
                    "must be positive",
                )
                .into());
            }
            if policy.max_words_per_request == Some(0) {
                return Err(ConfigError::for_key(
                    format!("plans.{plan}.max_words_per_request"),
                    "must be positive",
                )
                .into());
            }
        }

        if !(self.subscription.price.is_finite() && self.subscription.price > 0.0) {
            return Err(ConfigError::for_key("subscription.price", "must be positive").into());
        }

        Ok(())
    }
}
