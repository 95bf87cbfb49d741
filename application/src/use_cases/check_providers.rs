//! Check providers use case
//!
//! Reports which registered providers have a credential and, optionally,
//! whether they answer a tiny live prompt.

use crate::registry::ProviderRegistry;
use futures::future::join_all;
use hotbox_domain::{Outcome, PromptTemplate, ProviderId};
use std::time::Duration;
use tracing::info;

/// Status of one provider
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    pub provider: ProviderId,
    pub has_credential: bool,
    /// Live check result, when a live check was requested and possible
    pub outcome: Option<Outcome>,
}

impl ProviderStatus {
    /// Usable: a credential is present and the live check (if any) succeeded
    pub fn is_ready(&self) -> bool {
        self.has_credential && self.outcome.as_ref().is_none_or(|o| o.is_success())
    }
}

/// Use case for checking provider credentials
pub struct CheckProvidersUseCase {
    registry: ProviderRegistry,
    timeout: Duration,
}

impl CheckProvidersUseCase {
    pub fn new(registry: ProviderRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Check every registered provider, in registration order.
    ///
    /// With `live` set, providers that have a credential receive
    /// [`PromptTemplate::health_check`] concurrently.
    pub async fn execute(&self, live: bool) -> Vec<ProviderStatus> {
        info!(live, providers = self.registry.len(), "Probing providers");

        let checks = self.registry.iter().map(|provider| async move {
            let has_credential = provider.has_credential();
            let outcome = if live && has_credential {
                Some(provider.send(PromptTemplate::health_check(), self.timeout).await)
            } else {
                None
            };
            ProviderStatus {
                provider: provider.id().clone(),
                has_credential,
                outcome,
            }
        });

        join_all(checks).await
    }
}
