//! Plan limits and usage accounting for voice generation.
//!
//! The crate is layered leaf-first:
//! - [`PlanPolicy`] / [`PolicyTable`] - per-tier limits, loaded from [`StudioConfig`]
//! - [`evaluate`] - pure permit/deny decision with the daily rollover applied
//! - [`QuotaService`] - serializes requests per account and hands out a
//!   [`UsagePermit`] that is committed only after the generation succeeded
//! - [`MemoryUsageStore`] - in-process store for tests and local runs
//!
//! ```ignore
//! match quota.authorize(account, &text).await? {
//!     QuotaOutcome::Permitted(permit) => {
//!         let audio = synthesizer.synthesize(&text).await?;
//!         let report = permit.commit().await?;
//!     }
//!     QuotaOutcome::Denied(report) => { /* map report.denial */ }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod evaluator;
mod memory;
mod policy;
mod service;

pub use config::{
    LoggingConfig, ServerConfig, StudioConfig, SubscriptionConfig, SynthesisConfig,
};
pub use evaluator::{Decision, DenialReason, Evaluation, evaluate};
pub use memory::MemoryUsageStore;
pub use policy::{PlanPolicy, PolicyTable};
pub use service::{QuotaOutcome, QuotaReport, QuotaService, UsagePermit};
