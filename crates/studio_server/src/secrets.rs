//! Credentials read from the environment.
//!
//! These never live in `studio.toml`.

use std::env;
use studio_error::{ConfigError, StudioResult};

/// Database connection string.
pub const DATABASE_URL: &str = "DATABASE_URL";
/// Speech vendor API key.
pub const LEMONFOX_API_KEY: &str = "LEMONFOX_API_KEY";
/// HS256 signing secret for access tokens.
pub const JWT_SECRET: &str = "STUDIO_JWT_SECRET";
/// Key required by the admin routes.
pub const ADMIN_KEY: &str = "STUDIO_ADMIN_KEY";

/// Secrets the server needs at startup.
#[derive(Clone)]
pub struct Secrets {
    /// Postgres URL
    pub database_url: String,
    /// Signing secret
    pub jwt_secret: String,
    /// `None` leaves synthesis unconfigured
    pub lemonfox_api_key: Option<String>,
    /// `None` disables the admin routes
    pub admin_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("lemonfox_api_key", &self.lemonfox_api_key.is_some())
            .field("admin_key", &self.admin_key.is_some())
            .finish_non_exhaustive()
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &str) -> StudioResult<String> {
    optional(name).ok_or_else(|| ConfigError::for_key(name, "must be set").into())
}

impl Secrets {
    /// Read every secret. The database URL and JWT secret are required.
    pub fn from_env() -> StudioResult<Self> {
        Ok(Self {
            database_url: required(DATABASE_URL)?,
            jwt_secret: required(JWT_SECRET)?,
            lemonfox_api_key: optional(LEMONFOX_API_KEY),
            admin_key: optional(ADMIN_KEY),
        })
    }
}
