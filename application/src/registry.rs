//! Provider registry
//!
//! The set of adapters the orchestrator may call, keyed by [`ProviderId`]
//! and kept in registration order.

use crate::ports::llm_provider::LlmProvider;
use crate::use_cases::dispatch::DispatchError;
use hotbox_domain::{Mode, ProviderId};
use std::sync::Arc;
use tracing::warn;

/// Registered provider adapters
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter. A later registration under the same id
    /// replaces the earlier one in place.
    pub fn register(&mut self, provider: Arc<dyn LlmProvider>) {
        if let Some(slot) = self
            .providers
            .iter_mut()
            .find(|p| p.id() == provider.id())
        {
            warn!(provider = %provider.id(), "Provider registered twice, replacing");
            *slot = provider;
        } else {
            self.providers.push(provider);
        }
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, id: &ProviderId) -> Option<Arc<dyn LlmProvider>> {
        self.providers.iter().find(|p| p.id() == id).cloned()
    }

    /// Look up a provider, failing with `UnknownProvider`
    pub fn require(&self, id: &ProviderId) -> Result<Arc<dyn LlmProvider>, DispatchError> {
        self.get(id)
            .ok_or_else(|| DispatchError::UnknownProvider(id.clone()))
    }

    pub fn contains(&self, id: &ProviderId) -> bool {
        self.providers.iter().any(|p| p.id() == id)
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn LlmProvider>> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Check that a mode is well formed and only references registered
    /// providers (arbiter included)
    pub fn check_mode(&self, mode: &Mode) -> Result<(), DispatchError> {
        if self.is_empty() {
            return Err(DispatchError::NoProviders);
        }
        mode.validate()?;
        match mode.referenced_providers().find(|id| !self.contains(id)) {
            Some(missing) => Err(DispatchError::UnknownProvider(missing.clone())),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_provider::ProviderError;
    use async_trait::async_trait;
    use hotbox_domain::Completion;

    struct EchoProvider {
        id: ProviderId,
        reply: &'static str,
    }

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn id(&self) -> &ProviderId {
            &self.id
        }

        async fn complete(&self, _prompt: &str) -> Result<Completion, ProviderError> {
            Ok(Completion::new(self.reply))
        }
    }

    fn echo(id: ProviderId, reply: &'static str) -> Arc<dyn LlmProvider> {
        Arc::new(EchoProvider { id, reply })
    }

    #[test]
    fn keeps_registration_order() {
        let registry = ProviderRegistry::new()
            .with_provider(echo(ProviderId::Grok, "g"))
            .with_provider(echo(ProviderId::Gemini, "m"));
        assert_eq!(registry.ids(), vec![ProviderId::Grok, ProviderId::Gemini]);
    }

    #[tokio::test]
    async fn duplicate_registration_replaces_in_place() {
        let registry = ProviderRegistry::new()
            .with_provider(echo(ProviderId::Grok, "old"))
            .with_provider(echo(ProviderId::Claude, "c"))
            .with_provider(echo(ProviderId::Grok, "new"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids()[0], ProviderId::Grok);

        let grok = registry.get(&ProviderId::Grok).unwrap();
        assert_eq!(grok.complete("x").await.unwrap().text, "new");
    }

    #[test]
    fn check_mode_rejects_unregistered_arbiter() {
        let registry = ProviderRegistry::new()
            .with_provider(echo(ProviderId::Gemini, "a"))
            .with_provider(echo(ProviderId::Claude, "b"));
        let mode: Mode = "best:gemini,claude@openai".parse().unwrap();
        assert!(matches!(
            registry.check_mode(&mode),
            Err(DispatchError::UnknownProvider(ProviderId::OpenAi))
        ));
    }

    #[test]
    fn check_mode_on_empty_registry() {
        let mode: Mode = "single:gemini".parse().unwrap();
        assert!(matches!(
            ProviderRegistry::new().check_mode(&mode),
            Err(DispatchError::NoProviders)
        ));
    }

    #[test]
    fn check_mode_accepts_registered_set() {
        let registry = ProviderRegistry::new()
            .with_provider(echo(ProviderId::Gemini, "a"))
            .with_provider(echo(ProviderId::DeepSeek, "b"));
        let mode: Mode = "consensus:gemini,deepseek".parse().unwrap();
        assert!(registry.check_mode(&mode).is_ok());
    }
}
