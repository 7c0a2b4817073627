//! Core data types for the Studio voice-generation service.
//!
//! This crate provides the plain data shared by every layer: the plan tier, the
//! per-account usage record the quota engine reasons about, the calendar clock,
//! and the account, history and payment records exposed by the API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod clock;
mod plan;
mod profile;
mod subscription;
mod words;

pub use account::{AccountId, AccountUsage, UsageCharge};
pub use clock::{Clock, FixedClock, SystemClock};
pub use plan::Plan;
pub use profile::{AccountProfile, VoiceHistoryEntry};
pub use subscription::{PaymentRecord, PaymentStatus, SubscriptionRequest};
pub use words::count_words;
