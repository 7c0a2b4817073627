//! Error types for the Studio service.
//!
//! This crate provides the foundation error types used throughout the Studio workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Quota denials are not errors. They are ordinary decision values produced by
//! `studio_quota`; only failures to *reach* a decision or to persist one end up here.
//!
//! # Examples
//!
//! ```
//! use studio_error::{ConfigError, StudioResult};
//!
//! fn load() -> StudioResult<String> {
//!     Err(ConfigError::new("missing [plans.free] section"))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod billing;
mod config;
mod database;
mod error;
mod quota;
mod server;
mod synthesis;

pub use billing::{BillingError, BillingErrorKind};
pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{StudioError, StudioErrorKind, StudioResult};
pub use quota::{QuotaError, QuotaErrorKind};
pub use server::{ServerError, ServerErrorKind};
pub use synthesis::{SynthesisError, SynthesisErrorKind};
