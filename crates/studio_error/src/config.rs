//! Configuration error types.
//!
//! Raised while loading `studio.toml`, its `STUDIO__*` overrides and the
//! secrets read from the environment.

use std::fmt;

/// A missing or unusable setting.
///
/// `key` names the offending setting when one can be pinned down, in the dotted
/// form used by the config file (`plans.free.max_lifetime_tokens`) or as the
/// environment variable name (`STUDIO_JWT_SECRET`).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error)]
pub struct ConfigError {
    /// Offending setting, if known
    pub key: Option<String>,
    /// What is wrong with it
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Error not tied to a single setting, such as an unreadable file.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::located(None, message.into())
    }

    /// Error for the setting `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use studio_error::ConfigError;
    ///
    /// let err = ConfigError::for_key("plans.free.max_lifetime_tokens", "must be positive");
    /// assert_eq!(err.key.as_deref(), Some("plans.free.max_lifetime_tokens"));
    /// assert!(err.to_string().contains("plans.free.max_lifetime_tokens must be positive"));
    /// ```
    #[track_caller]
    pub fn for_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::located(Some(key.into()), message.into())
    }

    #[track_caller]
    fn located(key: Option<String>, message: String) -> Self {
        let location = std::panic::Location::caller();
        Self {
            key,
            message,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(
                f,
                "Configuration Error: {} {} at line {} in {}",
                key, self.message, self.line, self.file
            ),
            None => write!(
                f,
                "Configuration Error: {} at line {} in {}",
                self.message, self.line, self.file
            ),
        }
    }
}
