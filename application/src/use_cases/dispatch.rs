//! Dispatch use case
//!
//! Sends one prompt to the providers its [`Mode`] names and folds their
//! answers into an [`OrchestrationResult`]. Provider failures are values in
//! the result; only configuration problems surface as [`DispatchError`].

use crate::config::DispatchParams;
use crate::ports::chat_recorder::{ChatRecorder, NoRecorder};
use crate::ports::progress::{DispatchProgress, NoProgress};
use crate::registry::ProviderRegistry;
use crate::use_cases::compose::PromptComposer;
use chrono::Utc;
use hotbox_domain::util::preview;
use hotbox_domain::{
    DomainError, ErrorKind, Mode, OrchestrationResult, Outcome, Prompt, PromptTemplate,
    ProviderId,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{self, JoinError, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that stop a dispatch before or while it runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(ProviderId),

    #[error("No providers registered")]
    NoProviders,

    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl From<DomainError> for DispatchError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::EmptyPrompt => DispatchError::InvalidPrompt(e.to_string()),
            DomainError::InvalidMode(msg) => DispatchError::InvalidMode(msg),
            DomainError::InvalidProvider(_) => DispatchError::InvalidMode(e.to_string()),
        }
    }
}

/// Provider calls spawned for one fan-out
struct InFlight {
    tasks: JoinSet<(usize, Outcome)>,
    slots: HashMap<task::Id, (usize, ProviderId)>,
    started: Instant,
}

impl InFlight {
    /// Turn a joined task into its slot and outcome. A panicked adapter
    /// becomes an `Internal` failure.
    fn settle(&self, joined: Result<(usize, Outcome), JoinError>) -> Option<(usize, Outcome)> {
        match joined {
            Ok(pair) => Some(pair),
            Err(e) => {
                let Some((index, provider)) = self.slots.get(&e.id()).cloned() else {
                    warn!("Join error for an untracked task: {}", e);
                    return None;
                };
                warn!(provider = %provider, "Provider task failed: {}", e);
                Some((
                    index,
                    Outcome::failure(
                        provider,
                        ErrorKind::Internal,
                        format!("adapter task failed: {}", e),
                        self.started.elapsed(),
                    ),
                ))
            }
        }
    }
}

fn lost_call(provider: &ProviderId, latency: Duration) -> Outcome {
    Outcome::failure(
        provider.clone(),
        ErrorKind::Internal,
        "call produced no outcome",
        latency,
    )
}

/// Lowest latency wins; ties go to declaration order
fn earliest(candidates: Vec<(usize, Outcome)>) -> Option<Outcome> {
    candidates
        .into_iter()
        .min_by_key(|(index, outcome)| (outcome.latency(), *index))
        .map(|(_, outcome)| outcome)
}

/// Map an arbiter reply that names a candidate onto that candidate
fn named_candidate(verdict: &str, outcomes: &[Outcome]) -> Option<Outcome> {
    let name = verdict
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric());
    if name.is_empty() {
        return None;
    }
    // Aliases such as "anthropic" or "xai" resolve to their vendor
    let parsed = name.parse::<ProviderId>().ok();
    outcomes
        .iter()
        .filter(|o| o.is_success())
        .find(|o| {
            parsed.as_ref() == Some(o.provider())
                || o.provider().as_str().eq_ignore_ascii_case(name)
                || o.provider().display_name().eq_ignore_ascii_case(name)
        })
        .cloned()
}

/// Use case for dispatching a prompt across providers
pub struct DispatchUseCase {
    registry: ProviderRegistry,
    recorder: Arc<dyn ChatRecorder>,
    composer: Option<PromptComposer>,
    params: DispatchParams,
    cancellation_token: Option<CancellationToken>,
}

impl DispatchUseCase {
    pub fn new(registry: ProviderRegistry, params: DispatchParams) -> Self {
        Self {
            registry,
            recorder: Arc::new(NoRecorder),
            composer: None,
            params,
            cancellation_token: None,
        }
    }

    /// Persist every finished result through this recorder
    pub fn with_recorder(mut self, recorder: Arc<dyn ChatRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Add persona and history context to the text providers receive
    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = Some(composer);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    /// Dispatch with default (no-op) progress
    pub async fn dispatch(&self, prompt: &Prompt) -> Result<OrchestrationResult, DispatchError> {
        self.dispatch_with_progress(prompt, &NoProgress).await
    }

    /// Dispatch with progress callbacks
    pub async fn dispatch_with_progress(
        &self,
        prompt: &Prompt,
        progress: &dyn DispatchProgress,
    ) -> Result<OrchestrationResult, DispatchError> {
        let mode = prompt.mode();
        self.registry.check_mode(mode)?;
        self.check_cancelled()?;

        info!(
            mode = %mode,
            session = %prompt.session(),
            "Dispatching prompt: {}",
            preview(prompt.text(), 60)
        );

        let wire_text = self.compose(prompt).await;
        progress.on_dispatch_start(mode.kind(), mode.providers().len());

        let result = match mode {
            Mode::Single(provider) => {
                let outcome = self.query_one(provider, &wire_text, progress).await?;
                OrchestrationResult::single(prompt.text(), outcome)
            }
            Mode::Fastest(providers) => {
                let winner = self.race(providers, &wire_text, progress).await?;
                OrchestrationResult::fastest(prompt.text(), winner)
            }
            Mode::Consensus(providers) | Mode::Parallel(providers) => {
                let outcomes = self.query_all(providers, &wire_text, progress).await?;
                OrchestrationResult::collected(mode.kind(), prompt.text(), outcomes)
            }
            Mode::Best { providers, arbiter } => {
                self.judge(prompt.text(), &wire_text, providers, arbiter, progress)
                    .await?
            }
        };

        info!(
            mode = %result.mode,
            succeeded = result.successes().count(),
            failed = result.failures().count(),
            "Dispatch complete"
        );
        progress.on_dispatch_complete(&result);

        if let Err(e) = self
            .recorder
            .record(prompt.session(), &result, Utc::now())
            .await
        {
            warn!(session = %prompt.session(), "Failed to record dispatch result: {}", e);
        }

        Ok(result)
    }

    fn check_cancelled(&self) -> Result<(), DispatchError> {
        match &self.cancellation_token {
            Some(token) if token.is_cancelled() => Err(DispatchError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Text actually sent to providers: persona and history applied
    async fn compose(&self, prompt: &Prompt) -> String {
        let Some(composer) = &self.composer else {
            return prompt.text().to_string();
        };

        let history = if composer.uses_history() {
            match self
                .recorder
                .history(prompt.session(), composer.history_turns())
                .await
            {
                Ok(turns) => turns,
                Err(e) => {
                    warn!(session = %prompt.session(), "Failed to load history: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        composer.compose(prompt.text(), &history)
    }

    /// Spawn one task per provider, each with its own deadline
    fn launch(&self, providers: &[ProviderId], text: &str) -> Result<InFlight, DispatchError> {
        let text: Arc<str> = Arc::from(text);
        let timeout = self.params.timeout;
        let mut tasks = JoinSet::new();
        let mut slots = HashMap::new();

        for (index, id) in providers.iter().enumerate() {
            let provider = self.registry.require(id)?;
            let text = Arc::clone(&text);
            let handle = tasks.spawn(async move { (index, provider.send(&text, timeout).await) });
            slots.insert(handle.id(), (index, id.clone()));
        }

        debug!("Launched {} provider calls", providers.len());
        Ok(InFlight {
            tasks,
            slots,
            started: Instant::now(),
        })
    }

    /// Wait for the next finished call, aborting everything on cancellation
    async fn next_outcome(
        &self,
        calls: &mut InFlight,
    ) -> Result<Option<(usize, Outcome)>, DispatchError> {
        loop {
            let joined = if let Some(token) = &self.cancellation_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        calls.tasks.abort_all();
                        return Err(DispatchError::Cancelled);
                    }
                    joined = calls.tasks.join_next() => joined,
                }
            } else {
                calls.tasks.join_next().await
            };

            let Some(joined) = joined else {
                return Ok(None);
            };
            if let Some(settled) = calls.settle(joined) {
                return Ok(Some(settled));
            }
        }
    }

    /// Query every provider and wait for all of them.
    ///
    /// Outcomes come back in declaration order regardless of which call
    /// finished first.
    async fn query_all(
        &self,
        providers: &[ProviderId],
        text: &str,
        progress: &dyn DispatchProgress,
    ) -> Result<Vec<Outcome>, DispatchError> {
        let mut calls = self.launch(providers, text)?;
        let mut slots: Vec<Option<Outcome>> = providers.iter().map(|_| None).collect();

        while let Some((index, outcome)) = self.next_outcome(&mut calls).await? {
            debug!(
                provider = %outcome.provider(),
                success = outcome.is_success(),
                latency_ms = outcome.latency().as_millis() as u64,
                "Provider finished"
            );
            progress.on_provider_complete(&outcome);
            slots[index] = Some(outcome);
        }

        let elapsed = calls.started.elapsed();
        Ok(slots
            .into_iter()
            .zip(providers)
            .map(|(slot, id)| slot.unwrap_or_else(|| lost_call(id, elapsed)))
            .collect())
    }

    async fn query_one(
        &self,
        provider: &ProviderId,
        text: &str,
        progress: &dyn DispatchProgress,
    ) -> Result<Outcome, DispatchError> {
        let mut outcomes = self
            .query_all(std::slice::from_ref(provider), text, progress)
            .await?;
        Ok(outcomes
            .pop()
            .unwrap_or_else(|| lost_call(provider, Duration::ZERO)))
    }

    /// `fastest`: first success wins, the rest are aborted.
    ///
    /// When every call fails the quickest failure is returned instead.
    async fn race(
        &self,
        providers: &[ProviderId],
        text: &str,
        progress: &dyn DispatchProgress,
    ) -> Result<Outcome, DispatchError> {
        let mut calls = self.launch(providers, text)?;
        let mut successes = Vec::new();
        let mut failures = Vec::new();

        while let Some((index, outcome)) = self.next_outcome(&mut calls).await? {
            progress.on_provider_complete(&outcome);
            if !outcome.is_success() {
                debug!(provider = %outcome.provider(), "Fastest candidate failed");
                failures.push((index, outcome));
                continue;
            }
            successes.push((index, outcome));

            // Calls that finished at the same instant still compete on latency
            task::yield_now().await;
            while let Some(joined) = calls.tasks.try_join_next() {
                if let Some((index, outcome)) = calls.settle(joined) {
                    progress.on_provider_complete(&outcome);
                    if outcome.is_success() {
                        successes.push((index, outcome));
                    } else {
                        failures.push((index, outcome));
                    }
                }
            }
            break;
        }

        if !calls.tasks.is_empty() {
            debug!("Aborting {} slower provider calls", calls.tasks.len());
            calls.tasks.abort_all();
        }

        let elapsed = calls.started.elapsed();
        Ok(earliest(successes)
            .or_else(|| earliest(failures))
            .unwrap_or_else(|| lost_call(&providers[0], elapsed)))
    }

    /// `best`: collect every answer, then let the arbiter pick
    async fn judge(
        &self,
        question: &str,
        text: &str,
        providers: &[ProviderId],
        arbiter: &ProviderId,
        progress: &dyn DispatchProgress,
    ) -> Result<OrchestrationResult, DispatchError> {
        let outcomes = self.query_all(providers, text, progress).await?;

        let candidates: Vec<(ProviderId, String)> = outcomes
            .iter()
            .filter_map(|o| o.text().map(|t| (o.provider().clone(), t.to_string())))
            .collect();

        if candidates.is_empty() {
            warn!("No provider succeeded, skipping arbiter");
            return Ok(OrchestrationResult::best(question, outcomes, None, None));
        }

        info!(arbiter = %arbiter, candidates = candidates.len(), "Asking arbiter");
        progress.on_arbiter_start(arbiter);

        let request = PromptTemplate::arbiter_prompt(question, &candidates);
        let verdict = self.query_one(arbiter, &request, &NoProgress).await?;

        let selected = match verdict.text() {
            Some(reply) => match named_candidate(reply, &outcomes) {
                Some(candidate) => {
                    debug!(winner = %candidate.provider(), "Arbiter picked a candidate");
                    candidate
                }
                None => verdict.clone(),
            },
            None => {
                warn!(arbiter = %arbiter, "Arbiter failed, falling back to first success");
                match outcomes.iter().find(|o| o.is_success()) {
                    Some(first) => first.clone(),
                    None => verdict.clone(),
                }
            }
        };

        Ok(OrchestrationResult::best(
            question,
            outcomes,
            Some(verdict),
            Some(selected),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_recorder::RecordError;
    use crate::ports::llm_provider::{LlmProvider, ProviderError};
    use async_trait::async_trait;
    use chrono::DateTime;
    use hotbox_domain::{ChatTurn, Completion, ModeKind, SessionId};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    enum Behavior {
        Succeed(&'static str),
        Fail(ProviderError),
        Hang,
        Panic,
    }

    struct MockProvider {
        id: ProviderId,
        delay: Duration,
        behavior: Behavior,
        calls: AtomicUsize,
        completed: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn new(id: &str, delay_ms: u64, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                id: id.parse().unwrap(),
                delay: Duration::from_millis(delay_ms),
                behavior,
                calls: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn ok(id: &str, delay_ms: u64, text: &'static str) -> Arc<Self> {
            Self::new(id, delay_ms, Behavior::Succeed(text))
        }

        fn err(id: &str, delay_ms: u64, error: ProviderError) -> Arc<Self> {
            Self::new(id, delay_ms, Behavior::Fail(error))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn completed(&self) -> usize {
            self.completed.load(Ordering::SeqCst)
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn id(&self) -> &ProviderId {
            &self.id
        }

        async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            tokio::time::sleep(self.delay).await;
            let result = match &self.behavior {
                Behavior::Succeed(text) => Ok(Completion::new(*text).with_tokens(12)),
                Behavior::Fail(e) => Err(e.clone()),
                Behavior::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                Behavior::Panic => panic!("adapter bug"),
            };
            self.completed.fetch_add(1, Ordering::SeqCst);
            result
        }
    }

    #[derive(Default)]
    struct MockRecorder {
        records: Mutex<Vec<(SessionId, OrchestrationResult)>>,
        history: Vec<ChatTurn>,
    }

    #[async_trait]
    impl ChatRecorder for MockRecorder {
        async fn record(
            &self,
            session: &SessionId,
            result: &OrchestrationResult,
            _at: DateTime<Utc>,
        ) -> Result<(), RecordError> {
            self.records
                .lock()
                .unwrap()
                .push((session.clone(), result.clone()));
            Ok(())
        }

        async fn history(
            &self,
            _session: &SessionId,
            max_turns: usize,
        ) -> Result<Vec<ChatTurn>, RecordError> {
            let start = self.history.len().saturating_sub(max_turns);
            Ok(self.history[start..].to_vec())
        }
    }

    struct FailingRecorder;

    #[async_trait]
    impl ChatRecorder for FailingRecorder {
        async fn record(
            &self,
            _session: &SessionId,
            _result: &OrchestrationResult,
            _at: DateTime<Utc>,
        ) -> Result<(), RecordError> {
            Err(RecordError::Serialization("disk full".to_string()))
        }
    }

    fn use_case(providers: &[&Arc<MockProvider>]) -> DispatchUseCase {
        let registry = providers.iter().fold(ProviderRegistry::new(), |r, p| {
            r.with_provider(Arc::clone(*p) as Arc<dyn LlmProvider>)
        });
        DispatchUseCase::new(
            registry,
            DispatchParams::default().with_timeout(Duration::from_secs(1)),
        )
    }

    fn prompt(mode: &str) -> Prompt {
        Prompt::new("What is Rust?", mode.parse().unwrap()).unwrap()
    }

    fn ids(outcomes: &[Outcome]) -> Vec<&str> {
        outcomes.iter().map(|o| o.provider().as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_returns_provider_outcome() {
        let a = MockProvider::ok("a", 40, "hello");
        let result = use_case(&[&a]).dispatch(&prompt("single:a")).await.unwrap();

        assert_eq!(result.mode, ModeKind::Single);
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.answer_text(), Some("hello"));
        assert_eq!(result.outcomes[0].latency(), Duration::from_millis(40));
        assert_eq!(a.prompts(), vec!["What is Rust?".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_failure_is_in_band() {
        let a = MockProvider::err("a", 5, ProviderError::RateLimited("HTTP 429".into()));
        let result = use_case(&[&a]).dispatch(&prompt("single:a")).await.unwrap();

        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.outcomes[0].error_kind(), Some(ErrorKind::RateLimit));
        assert!(result.all_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fastest_returns_lowest_latency_success() {
        let a = MockProvider::ok("a", 300, "from a");
        let b = MockProvider::ok("b", 50, "from b");
        let c = MockProvider::ok("c", 900, "from c");
        let result = use_case(&[&a, &b, &c])
            .dispatch(&prompt("fastest:a,b,c"))
            .await
            .unwrap();

        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.outcomes[0].provider().as_str(), "b");
        assert_eq!(result.answer_text(), Some("from b"));

        // Slower calls were aborted, not left running
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(b.completed(), 1);
        assert_eq!(a.completed(), 0);
        assert_eq!(c.completed(), 0);
        assert_eq!(a.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fastest_all_failed_returns_quickest_failure() {
        let a = MockProvider::err("a", 500, ProviderError::Transport("HTTP 502".into()));
        let b = MockProvider::err("b", 200, ProviderError::Unauthorized("HTTP 401".into()));
        let result = use_case(&[&a, &b])
            .dispatch(&prompt("fastest:a,b"))
            .await
            .unwrap();

        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.outcomes[0].provider().as_str(), "b");
        assert_eq!(result.outcomes[0].error_kind(), Some(ErrorKind::Authentication));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fastest_failure_tie_goes_to_declaration_order() {
        let a = MockProvider::err("a", 200, ProviderError::Transport("reset".into()));
        let b = MockProvider::err("b", 200, ProviderError::Transport("reset".into()));
        let result = use_case(&[&a, &b])
            .dispatch(&prompt("fastest:a,b"))
            .await
            .unwrap();

        assert_eq!(result.outcomes[0].provider().as_str(), "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fastest_prefers_late_success_over_early_failure() {
        let a = MockProvider::err("a", 10, ProviderError::RateLimited("HTTP 429".into()));
        let b = MockProvider::ok("b", 400, "slow but right");
        let result = use_case(&[&a, &b])
            .dispatch(&prompt("fastest:a,b"))
            .await
            .unwrap();

        assert_eq!(result.answer_text(), Some("slow but right"));
        assert!(result.outcomes[0].is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_consensus_keeps_declaration_order() {
        let a = MockProvider::ok("a", 700, "a");
        let b = MockProvider::ok("b", 10, "b");
        let c = MockProvider::ok("c", 300, "c");
        let result = use_case(&[&a, &b, &c])
            .dispatch(&prompt("consensus:c,a,b"))
            .await
            .unwrap();

        assert_eq!(result.mode, ModeKind::Consensus);
        assert_eq!(ids(&result.outcomes), vec!["c", "a", "b"]);
        assert!(result.selected.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_matches_consensus() {
        let a = MockProvider::ok("a", 100, "one");
        let b = MockProvider::ok("b", 20, "two");
        let result = use_case(&[&a, &b])
            .dispatch(&prompt("parallel:a,b"))
            .await
            .unwrap();

        assert_eq!(result.mode, ModeKind::Parallel);
        assert_eq!(ids(&result.outcomes), vec!["a", "b"]);
        assert_eq!(result.outcomes[1].text(), Some("two"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_does_not_hide_successes() {
        let a = MockProvider::ok("a", 50, "fine");
        let b = MockProvider::err("b", 5, ProviderError::MissingCredential("B_KEY".into()));
        let c = MockProvider::ok("c", 80, "also fine");
        let result = use_case(&[&a, &b, &c])
            .dispatch(&prompt("consensus:a,b,c"))
            .await
            .unwrap();

        assert_eq!(result.outcomes.len(), 3);
        assert_eq!(result.successes().count(), 2);
        assert_eq!(result.outcomes[1].error_kind(), Some(ErrorKind::Authentication));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_does_not_delay_other_outcomes() {
        let a = MockProvider::new("a", 0, Behavior::Hang);
        let b = MockProvider::ok("b", 100, "quick");
        let result = use_case(&[&a, &b])
            .dispatch(&prompt("consensus:a,b"))
            .await
            .unwrap();

        assert_eq!(result.outcomes[0].error_kind(), Some(ErrorKind::Timeout));
        assert_eq!(result.outcomes[0].latency(), Duration::from_secs(1));
        assert_eq!(result.outcomes[1].latency(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_best_falls_back_to_first_success_when_arbiter_fails() {
        let a = MockProvider::err("a", 10, ProviderError::Transport("HTTP 500".into()));
        let b = MockProvider::ok("b", 60, "b answer");
        let c = MockProvider::ok("c", 30, "c answer");
        let judge = MockProvider::err("judge", 5, ProviderError::RateLimited("HTTP 429".into()));
        let result = use_case(&[&a, &b, &c, &judge])
            .dispatch(&prompt("best:a,b,c@judge"))
            .await
            .unwrap();

        assert_eq!(result.outcomes.len(), 3);
        assert_eq!(
            result.arbiter.as_ref().and_then(|o| o.error_kind()),
            Some(ErrorKind::RateLimit)
        );
        let selected = result.selected.as_ref().unwrap();
        assert_eq!(selected.provider().as_str(), "b");
        assert_eq!(selected.text(), Some("b answer"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_best_resolves_named_candidate() {
        let a = MockProvider::ok("a", 10, "a answer");
        let b = MockProvider::ok("b", 20, "b answer");
        let judge = MockProvider::ok("judge", 5, "  B.\n");
        let result = use_case(&[&a, &b, &judge])
            .dispatch(&prompt("best:a,b@judge"))
            .await
            .unwrap();

        let selected = result.selected.as_ref().unwrap();
        assert_eq!(selected.provider().as_str(), "b");
        assert_eq!(selected.text(), Some("b answer"));
        assert_eq!(result.arbiter.as_ref().unwrap().text(), Some("  B.\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_best_resolves_vendor_alias() {
        let claude = MockProvider::ok("claude", 10, "claude answer");
        let grok = MockProvider::ok("grok", 20, "grok answer");
        let judge = MockProvider::ok("judge", 5, "Anthropic");
        let result = use_case(&[&claude, &grok, &judge])
            .dispatch(&prompt("best:claude,grok@judge"))
            .await
            .unwrap();
        assert_eq!(
            result.selected.as_ref().unwrap().provider(),
            &ProviderId::Claude
        );

        assert_eq!(
            named_candidate("xAI.", &result.outcomes).unwrap().provider(),
            &ProviderId::Grok
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_best_selects_arbiter_synthesis() {
        let a = MockProvider::ok("a", 10, "a answer");
        let judge = MockProvider::ok("judge", 5, "A better combined answer.");
        let result = use_case(&[&a, &judge])
            .dispatch(&prompt("best:a@judge"))
            .await
            .unwrap();

        let selected = result.selected.as_ref().unwrap();
        assert_eq!(selected.provider().as_str(), "judge");
        assert_eq!(selected.text(), Some("A better combined answer."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_best_skips_arbiter_without_successes() {
        let a = MockProvider::err("a", 10, ProviderError::Transport("down".into()));
        let judge = MockProvider::ok("judge", 5, "a");
        let result = use_case(&[&a, &judge])
            .dispatch(&prompt("best:a@judge"))
            .await
            .unwrap();

        assert_eq!(judge.calls(), 0);
        assert!(result.arbiter.is_none());
        assert!(result.selected.is_none());
        assert_eq!(result.outcomes.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arbiter_sees_only_successful_texts() {
        let a = MockProvider::ok("a", 10, "ALPHA TEXT");
        let b = MockProvider::err("b", 10, ProviderError::MalformedResponse("no choices".into()));
        let judge = MockProvider::ok("judge", 5, "a");
        use_case(&[&a, &b, &judge])
            .dispatch(&prompt("best:a,b@judge"))
            .await
            .unwrap();

        let seen = judge.prompts();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("ALPHA TEXT"));
        assert!(seen[0].contains("What is Rust?"));
        assert!(!seen[0].contains("--- b ---"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_provider_fails_before_any_call() {
        let a = MockProvider::ok("a", 10, "a");
        let err = use_case(&[&a])
            .dispatch(&prompt("consensus:a,ghost"))
            .await
            .unwrap_err();

        assert_eq!(err, DispatchError::UnknownProvider("ghost".parse().unwrap()));
        assert_eq!(a.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_arbiter_fails_before_any_call() {
        let a = MockProvider::ok("a", 10, "a");
        let err = use_case(&[&a])
            .dispatch(&prompt("best:a@ghost"))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::UnknownProvider(_)));
        assert_eq!(a.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_registry() {
        let err = use_case(&[])
            .dispatch(&prompt("single:a"))
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::NoProviders);
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_exactly_once() {
        let a = MockProvider::ok("a", 10, "a");
        let b = MockProvider::ok("b", 20, "b");
        let recorder = Arc::new(MockRecorder::default());
        let dispatcher = use_case(&[&a, &b]).with_recorder(recorder.clone());

        let prompt = prompt("consensus:a,b").in_session(SessionId::from("s-1"));
        let result = dispatcher.dispatch(&prompt).await.unwrap();

        let records = recorder.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0.as_str(), "s-1");
        assert_eq!(records[0].1, result);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recorder_failure_keeps_result() {
        let a = MockProvider::ok("a", 10, "kept");
        let result = use_case(&[&a])
            .with_recorder(Arc::new(FailingRecorder))
            .dispatch(&prompt("single:a"))
            .await
            .unwrap();

        assert_eq!(result.answer_text(), Some("kept"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_is_idempotent_modulo_latency() {
        fn strip(result: &OrchestrationResult) -> Vec<(String, Option<String>, Option<ErrorKind>)> {
            result
                .outcomes
                .iter()
                .map(|o| {
                    (
                        o.provider().to_string(),
                        o.text().map(str::to_string),
                        o.error_kind(),
                    )
                })
                .collect()
        }

        let a = MockProvider::ok("a", 30, "same");
        let b = MockProvider::err("b", 10, ProviderError::Timeout);
        let dispatcher = use_case(&[&a, &b]);
        let prompt = prompt("consensus:a,b");

        let first = dispatcher.dispatch(&prompt).await.unwrap();
        let second = dispatcher.dispatch(&prompt).await.unwrap();
        assert_eq!(strip(&first), strip(&second));
        assert_eq!(first.mode, second.mode);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_stops_dispatch() {
        let a = MockProvider::ok("a", 10, "a");
        let token = CancellationToken::new();
        token.cancel();
        let err = use_case(&[&a])
            .with_cancellation(token)
            .dispatch(&prompt("single:a"))
            .await
            .unwrap_err();

        assert_eq!(err, DispatchError::Cancelled);
        assert_eq!(a.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_mid_flight_aborts_calls() {
        let a = MockProvider::ok("a", 5_000, "never");
        let token = CancellationToken::new();
        let dispatcher = DispatchUseCase::new(
            ProviderRegistry::new().with_provider(a.clone()),
            DispatchParams::default(),
        )
        .with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        });
        let err = dispatcher.dispatch(&prompt("single:a")).await.unwrap_err();
        canceller.await.unwrap();

        assert_eq!(err, DispatchError::Cancelled);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(a.completed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_adapter_becomes_internal_failure() {
        let a = MockProvider::new("a", 10, Behavior::Panic);
        let b = MockProvider::ok("b", 20, "ok");
        let result = use_case(&[&a, &b])
            .dispatch(&prompt("consensus:a,b"))
            .await
            .unwrap();

        assert_eq!(result.outcomes[0].provider().as_str(), "a");
        assert_eq!(result.outcomes[0].error_kind(), Some(ErrorKind::Internal));
        assert!(result.outcomes[1].is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_composer_shapes_provider_text_only() {
        let a = MockProvider::ok("a", 10, "answer");
        let recorder = Arc::new(MockRecorder {
            history: vec![ChatTurn::user("Hi"), ChatTurn::assistant("Hello!")],
            ..Default::default()
        });
        let result = use_case(&[&a])
            .with_recorder(recorder.clone())
            .with_composer(
                PromptComposer::new()
                    .with_identity("You are Holly.")
                    .with_history_turns(4),
            )
            .dispatch(&prompt("single:a"))
            .await
            .unwrap();

        let sent = &a.prompts()[0];
        assert!(sent.starts_with("You are Holly."));
        assert!(sent.contains("Assistant: Hello!"));
        assert!(sent.ends_with("What is Rust?"));
        assert_eq!(result.prompt, "What is Rust?");
    }

    #[test]
    fn test_domain_error_conversion() {
        assert!(matches!(
            DispatchError::from(DomainError::EmptyPrompt),
            DispatchError::InvalidPrompt(_)
        ));
        assert_eq!(
            DispatchError::from(DomainError::InvalidMode("warp".into())),
            DispatchError::InvalidMode("warp".into())
        );
    }
}
