//! Shared handler state.

use crate::auth::{AdminKey, TokenIssuer};
use std::sync::Arc;
use studio_interface::{AccountDirectory, SpeechSynthesizer, SubscriptionLedger, UsageStore};
use studio_quota::{QuotaService, SubscriptionConfig};

/// Quota service over any usage store.
pub type SharedQuota = Arc<QuotaService<dyn UsageStore>>;

/// Service handles injected into every handler.
///
/// Cloning is cheap: every field is reference counted.
#[derive(Clone, derive_getters::Getters)]
pub struct ApiState {
    /// Plan-limit gate
    quota: SharedQuota,
    /// Account lookup and voice history
    accounts: Arc<dyn AccountDirectory>,
    /// Subscription requests
    ledger: Arc<dyn SubscriptionLedger>,
    /// Text-to-speech vendor
    synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Access token signer
    tokens: Arc<TokenIssuer>,
    /// Admin key, `None` disables the admin routes
    admin_key: Option<AdminKey>,
    /// Subscription pricing
    subscription: SubscriptionConfig,
}

impl ApiState {
    /// Assemble state from its services.
    pub fn new(
        quota: SharedQuota,
        accounts: Arc<dyn AccountDirectory>,
        ledger: Arc<dyn SubscriptionLedger>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        tokens: TokenIssuer,
        admin_key: Option<AdminKey>,
        subscription: SubscriptionConfig,
    ) -> Self {
        Self {
            quota,
            accounts,
            ledger,
            synthesizer,
            tokens: Arc::new(tokens),
            admin_key,
            subscription,
        }
    }
}
