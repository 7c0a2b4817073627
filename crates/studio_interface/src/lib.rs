//! Trait definitions for the Studio service.
//!
//! Request handlers receive these as injected handles; concrete implementations
//! live in `studio_database` (PostgreSQL), `studio_quota` (in-memory) and
//! `studio_server` (vendor HTTP clients).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{AccountDirectory, SpeechSynthesizer, SubscriptionLedger, UsageStore};
