//! Model discovery, candidate caching, and fallback roster construction.
//!
//! A selector answers two questions for a session: which model to try first, and which
//! models to try after it. Discovery failures never surface to callers; the static
//! fallback list always supplies an answer.
//!
//! ```rust
//! use gprovider::{ModelRoster, StaticFallbackList};
//!
//! let fallback = StaticFallbackList::default();
//! assert_eq!(fallback.first(), "gemini-2.0-flash");
//!
//! let roster = ModelRoster::from_candidates(["gemini-1.5-pro", "gemini-2.0-flash", "gemini-1.5-pro"]);
//! assert_eq!(roster.as_slice(), ["gemini-1.5-pro", "gemini-2.0-flash"]);
//! ```

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::{GenerativeBackend, ModelDescriptor, ProviderError, ProviderFuture};

pub const DEFAULT_FALLBACK_MODELS: [&str; 5] = [
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-flash-8b",
    "gemini-1.5-pro",
    "gemini-pro",
];

/// Ordered, duplicate-free list of model candidates, preferred first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelRoster(Vec<String>);

impl ModelRoster {
    /// Keeps the first occurrence of each candidate.
    pub fn from_candidates<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for candidate in candidates {
            let candidate = candidate.into();
            if candidate.trim().is_empty() {
                continue;
            }
            if seen.insert(candidate.clone()) {
                ordered.push(candidate);
            }
        }
        Self(ordered)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.0.iter().any(|existing| existing == candidate)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl IntoIterator for ModelRoster {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Non-empty static preference list used when discovery cannot answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFallbackList {
    candidates: Vec<String>,
}

impl StaticFallbackList {
    /// `None` when every entry is blank.
    pub fn new(
        first: impl Into<String>,
        rest: impl IntoIterator<Item = impl Into<String>>,
    ) -> Option<Self> {
        Self::from_roster(ModelRoster::from_candidates(
            std::iter::once(first.into()).chain(rest.into_iter().map(Into::into)),
        ))
    }

    /// Parses a comma-separated list; `None` when no usable entry remains.
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_roster(ModelRoster::from_candidates(value.split(',').map(str::trim)))
    }

    fn from_roster(roster: ModelRoster) -> Option<Self> {
        (!roster.is_empty()).then(|| Self {
            candidates: roster.0,
        })
    }

    pub fn first(&self) -> &str {
        self.candidates.first().map(String::as_str).unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl Default for StaticFallbackList {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_FALLBACK_MODELS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Case-insensitive substring tiers, strongest preference first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPreference {
    tiers: Vec<String>,
}

impl ModelPreference {
    pub fn new(tiers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tiers: tiers
                .into_iter()
                .map(|tier| tier.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn tiers(&self) -> &[String] {
        &self.tiers
    }

    /// First candidate matching the strongest tier that has any match.
    pub fn pick<'a>(
        &self,
        candidates: &'a [String],
        rejected: &HashSet<String>,
    ) -> Option<&'a String> {
        self.tiers.iter().find_map(|tier| {
            candidates.iter().find(|candidate| {
                !rejected.contains(candidate.as_str())
                    && candidate.to_ascii_lowercase().contains(tier.as_str())
            })
        })
    }
}

impl Default for ModelPreference {
    fn default() -> Self {
        Self::new(["flash", "pro", "gemini"])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Cache,
    Discovery,
    StaticFallback,
    Forced,
}

impl Display for SelectionSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Cache => "cache",
            Self::Discovery => "discovery",
            Self::StaticFallback => "static_fallback",
            Self::Forced => "forced",
        };
        f.write_str(value)
    }
}

pub trait SelectorHooks: Send + Sync {
    fn on_candidate_selected(&self, _candidate: &str, _source: SelectionSource) {}

    fn on_discovery_fallback(&self, _reason: &str, _fallback: &str) {}

    fn on_invalidated(&self, _candidate: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSelectorHooks;

impl SelectorHooks for NoopSelectorHooks {}

/// Source of the backend's current model listing.
pub trait ModelDiscovery: Send + Sync {
    fn discover<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>>;
}

/// Discovery through a backend's `list_models` call.
#[derive(Clone)]
pub struct BackendDiscovery {
    backend: Arc<dyn GenerativeBackend>,
}

impl BackendDiscovery {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }
}

impl ModelDiscovery for BackendDiscovery {
    fn discover<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>> {
        self.backend.list_models()
    }
}

/// Chooses the model candidates a session should try, in order.
///
/// Implementations are shared across concurrent requests; a request may observe a
/// candidate another request has just invalidated.
pub trait ModelSelector: Send + Sync {
    /// Preferred candidate. Never fails.
    fn select_current<'a>(&'a self) -> ProviderFuture<'a, String>;

    /// Cached candidate (if any) followed by the static list, without duplicates.
    fn fallback_list(&self) -> ModelRoster;

    /// Drops the cached candidate so the next selection moves on.
    fn invalidate(&self);

    fn force_candidate(&self, candidate: &str);
}

#[derive(Debug, Default)]
struct SelectorState {
    cached: Option<String>,
    previous: Option<String>,
    rejected: HashSet<String>,
}

/// Selector backed by live discovery with a static fallback list.
pub struct DiscoveringModelSelector {
    discovery: Arc<dyn ModelDiscovery>,
    fallback: StaticFallbackList,
    preference: ModelPreference,
    discovery_timeout: Duration,
    hooks: Arc<dyn SelectorHooks>,
    state: Mutex<SelectorState>,
}

impl DiscoveringModelSelector {
    pub fn new(discovery: Arc<dyn ModelDiscovery>) -> Self {
        Self {
            discovery,
            fallback: StaticFallbackList::default(),
            preference: ModelPreference::default(),
            discovery_timeout: Duration::from_secs(10),
            hooks: Arc::new(NoopSelectorHooks),
            state: Mutex::new(SelectorState::default()),
        }
    }

    pub fn with_fallback(mut self, fallback: StaticFallbackList) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_preference(mut self, preference: ModelPreference) -> Self {
        self.preference = preference;
        self
    }

    pub fn with_discovery_timeout(mut self, discovery_timeout: Duration) -> Self {
        self.discovery_timeout = discovery_timeout;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn SelectorHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn cached(&self) -> Option<String> {
        self.lock_state().cached.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, SelectorState> {
        // The state stays consistent across a panic in another holder.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn discover_candidates(&self) -> Result<Vec<String>, String> {
        let listing = tokio::time::timeout(self.discovery_timeout, self.discovery.discover()).await;

        let descriptors = match listing {
            Ok(Ok(descriptors)) => descriptors,
            Ok(Err(error)) => return Err(format!("discovery failed: {error}")),
            Err(_) => {
                return Err(format!(
                    "discovery timed out after {}ms",
                    self.discovery_timeout.as_millis()
                ));
            }
        };

        let candidates = descriptors
            .iter()
            .filter(|descriptor| descriptor.supports_generation())
            .map(|descriptor| descriptor.candidate_id().to_string())
            .collect::<Vec<_>>();

        if candidates.is_empty() {
            return Err("discovery returned no usable models".to_string());
        }

        Ok(candidates)
    }

    fn choose(
        &self,
        discovered: Option<&[String]>,
        rejected: &HashSet<String>,
    ) -> Option<(String, SelectionSource)> {
        if let Some(discovered) = discovered
            && let Some(candidate) = self.preference.pick(discovered, rejected)
        {
            return Some((candidate.clone(), SelectionSource::Discovery));
        }

        self.fallback
            .as_slice()
            .iter()
            .find(|candidate| !rejected.contains(candidate.as_str()))
            .map(|candidate| (candidate.clone(), SelectionSource::StaticFallback))
    }
}

impl ModelSelector for DiscoveringModelSelector {
    fn select_current<'a>(&'a self) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            if let Some(cached) = self.lock_state().cached.clone() {
                self.hooks
                    .on_candidate_selected(&cached, SelectionSource::Cache);
                return cached;
            }

            let discovered = match self.discover_candidates().await {
                Ok(candidates) => Some(candidates),
                Err(reason) => {
                    tracing::warn!(
                        phase = "selector",
                        event = "discovery_fallback",
                        reason = %reason,
                        fallback = %self.fallback.first(),
                    );
                    self.hooks
                        .on_discovery_fallback(&reason, self.fallback.first());
                    None
                }
            };

            let mut state = self.lock_state();
            if let Some(cached) = state.cached.clone() {
                return cached;
            }

            let selection = match self.choose(discovered.as_deref(), &state.rejected) {
                Some(selection) => selection,
                None => {
                    // Every candidate was rejected this episode; start over but keep
                    // skipping the one that just failed.
                    state.rejected.clear();
                    if let Some(previous) = state.previous.clone() {
                        state.rejected.insert(previous);
                    }
                    self.choose(discovered.as_deref(), &state.rejected)
                        .or_else(|| {
                            state
                                .previous
                                .clone()
                                .map(|previous| (previous, SelectionSource::StaticFallback))
                        })
                        .unwrap_or_else(|| {
                            (
                                self.fallback.first().to_string(),
                                SelectionSource::StaticFallback,
                            )
                        })
                }
            };

            let (candidate, source) = selection;
            state.cached = Some(candidate.clone());
            drop(state);

            tracing::debug!(
                phase = "selector",
                event = "candidate_selected",
                model = %candidate,
                source = %source,
            );
            self.hooks.on_candidate_selected(&candidate, source);
            candidate
        })
    }

    fn fallback_list(&self) -> ModelRoster {
        let cached = self.lock_state().cached.clone();
        ModelRoster::from_candidates(
            cached
                .into_iter()
                .chain(self.fallback.as_slice().iter().cloned()),
        )
    }

    fn invalidate(&self) {
        let mut state = self.lock_state();
        if let Some(previous) = state.cached.take() {
            state.rejected.insert(previous.clone());
            state.previous = Some(previous.clone());
            drop(state);

            tracing::info!(phase = "selector", event = "invalidated", model = %previous);
            self.hooks.on_invalidated(&previous);
        }
    }

    fn force_candidate(&self, candidate: &str) {
        let mut state = self.lock_state();
        state.rejected.remove(candidate);
        state.cached = Some(candidate.to_string());
        drop(state);

        self.hooks
            .on_candidate_selected(candidate, SelectionSource::Forced);
    }
}

/// Selector over a fixed roster; the first entry is always the current candidate.
#[derive(Debug)]
pub struct FixedModelSelector {
    roster: Mutex<ModelRoster>,
    invalidations: Mutex<u32>,
}

impl FixedModelSelector {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roster: Mutex::new(ModelRoster::from_candidates(candidates)),
            invalidations: Mutex::new(0),
        }
    }

    pub fn invalidations(&self) -> u32 {
        *self
            .invalidations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn roster(&self) -> MutexGuard<'_, ModelRoster> {
        self.roster
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ModelSelector for FixedModelSelector {
    fn select_current<'a>(&'a self) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            self.roster()
                .first()
                .map(str::to_string)
                .unwrap_or_else(|| DEFAULT_FALLBACK_MODELS[0].to_string())
        })
    }

    fn fallback_list(&self) -> ModelRoster {
        self.roster().clone()
    }

    fn invalidate(&self) {
        let mut invalidations = self
            .invalidations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *invalidations += 1;
    }

    fn force_candidate(&self, candidate: &str) {
        let mut roster = self.roster();
        let reordered = ModelRoster::from_candidates(
            std::iter::once(candidate.to_string()).chain(roster.as_slice().iter().cloned()),
        );
        *roster = reordered;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    struct ScriptedDiscovery {
        result: Result<Vec<&'static str>, ProviderError>,
        calls: AtomicU32,
        delay: Option<Duration>,
    }

    impl ScriptedDiscovery {
        fn ok(names: Vec<&'static str>) -> Self {
            Self {
                result: Ok(names),
                calls: AtomicU32::new(0),
                delay: None,
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(ProviderError::transport("connection refused")),
                calls: AtomicU32::new(0),
                delay: None,
            }
        }
    }

    impl ModelDiscovery for ScriptedDiscovery {
        fn discover<'a>(
            &'a self,
        ) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                self.result.clone().map(|names| {
                    names
                        .into_iter()
                        .map(ModelDescriptor::new)
                        .collect::<Vec<_>>()
                })
            })
        }
    }

    #[derive(Default)]
    struct RecordingSelectorHooks {
        fallbacks: Mutex<Vec<String>>,
    }

    impl SelectorHooks for RecordingSelectorHooks {
        fn on_discovery_fallback(&self, reason: &str, fallback: &str) {
            self.fallbacks
                .lock()
                .expect("fallbacks lock")
                .push(format!("{fallback}:{reason}"));
        }
    }

    #[test]
    fn roster_deduplicates_preserving_first_seen_order() {
        let roster = ModelRoster::from_candidates(["b", "a", "b", "", "c", "a"]);
        assert_eq!(roster.as_slice(), ["b", "a", "c"]);
    }

    fn fallback(first: &str, rest: &[&str]) -> StaticFallbackList {
        StaticFallbackList::new(first, rest.iter().copied()).expect("fallback list")
    }

    #[test]
    fn static_fallback_rejects_all_blank_entries() {
        assert!(StaticFallbackList::new("", Vec::<String>::new()).is_none());
        assert!(StaticFallbackList::new(" ", ["", "  "]).is_none());

        let list = StaticFallbackList::new("", ["gemini-x"]).expect("one usable entry");
        assert_eq!(list.first(), "gemini-x");
        assert_eq!(StaticFallbackList::default().first(), DEFAULT_FALLBACK_MODELS[0]);
        assert_eq!(StaticFallbackList::default().len(), DEFAULT_FALLBACK_MODELS.len());
    }

    #[test]
    fn static_fallback_parse_ignores_blank_entries() {
        let parsed = StaticFallbackList::parse(" gemini-x , ,gemini-y,gemini-x").expect("list");
        assert_eq!(parsed.as_slice(), ["gemini-x", "gemini-y"]);
        assert!(StaticFallbackList::parse(" , ").is_none());
    }

    #[test]
    fn preference_prefers_flash_then_pro_then_any_gemini() {
        let rejected = HashSet::new();
        let names = vec![
            "text-embedding-004".to_string(),
            "gemini-1.5-pro".to_string(),
            "gemini-2.0-flash".to_string(),
        ];
        let preference = ModelPreference::default();
        assert_eq!(
            preference.pick(&names, &rejected).map(String::as_str),
            Some("gemini-2.0-flash")
        );

        let no_flash = vec!["gemini-ultra".to_string(), "gemini-1.0-pro".to_string()];
        assert_eq!(
            preference.pick(&no_flash, &rejected).map(String::as_str),
            Some("gemini-1.0-pro")
        );

        let unknown = vec!["palm-2".to_string()];
        assert_eq!(preference.pick(&unknown, &rejected), None);
    }

    #[tokio::test]
    async fn select_current_uses_discovery_and_caches_result() {
        let discovery = Arc::new(ScriptedDiscovery::ok(vec![
            "models/gemini-1.5-pro",
            "models/gemini-2.0-flash-exp",
        ]));
        let selector = DiscoveringModelSelector::new(discovery.clone());

        assert_eq!(selector.select_current().await, "gemini-2.0-flash-exp");
        assert_eq!(selector.select_current().await, "gemini-2.0-flash-exp");
        assert_eq!(discovery.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn select_current_falls_back_when_discovery_fails() {
        let hooks = Arc::new(RecordingSelectorHooks::default());
        let selector = DiscoveringModelSelector::new(Arc::new(ScriptedDiscovery::failing()))
            .with_hooks(hooks.clone());

        assert_eq!(selector.select_current().await, "gemini-2.0-flash");
        let fallbacks = hooks.fallbacks.lock().expect("fallbacks lock").clone();
        assert_eq!(fallbacks.len(), 1);
        assert!(fallbacks[0].starts_with("gemini-2.0-flash:discovery failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn select_current_falls_back_when_discovery_hangs() {
        let discovery = ScriptedDiscovery {
            result: Ok(vec!["gemini-2.5-flash"]),
            calls: AtomicU32::new(0),
            delay: Some(Duration::from_secs(60)),
        };
        let selector = DiscoveringModelSelector::new(Arc::new(discovery))
            .with_discovery_timeout(Duration::from_secs(1));

        assert_eq!(selector.select_current().await, "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn empty_discovery_uses_static_list() {
        let selector = DiscoveringModelSelector::new(Arc::new(ScriptedDiscovery::ok(Vec::new())))
            .with_fallback(fallback("gemini-x", &["gemini-y"]));

        assert_eq!(selector.select_current().await, "gemini-x");
    }

    #[tokio::test]
    async fn invalidate_never_returns_previous_candidate() {
        let selector = DiscoveringModelSelector::new(Arc::new(ScriptedDiscovery::failing()))
            .with_fallback(fallback("a", &["b", "c"]));

        let mut previous = selector.select_current().await;
        for _ in 0..7 {
            selector.invalidate();
            let next = selector.select_current().await;
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[tokio::test]
    async fn invalidate_skips_rediscovered_rejected_model() {
        let discovery = Arc::new(ScriptedDiscovery::ok(vec![
            "models/gemini-2.0-flash",
            "models/gemini-1.5-pro",
        ]));
        let selector = DiscoveringModelSelector::new(discovery)
            .with_fallback(fallback("gemini-2.0-flash", &["gemini-pro"]));

        assert_eq!(selector.select_current().await, "gemini-2.0-flash");
        selector.invalidate();
        assert_eq!(selector.select_current().await, "gemini-1.5-pro");
    }

    #[tokio::test]
    async fn single_candidate_roster_repeats_after_invalidate() {
        let selector = DiscoveringModelSelector::new(Arc::new(ScriptedDiscovery::failing()))
            .with_fallback(fallback("only", &[]));

        assert_eq!(selector.select_current().await, "only");
        selector.invalidate();
        assert_eq!(selector.select_current().await, "only");
    }

    #[tokio::test]
    async fn fallback_list_puts_cached_first_without_duplicates() {
        let selector = DiscoveringModelSelector::new(Arc::new(ScriptedDiscovery::failing()))
            .with_fallback(fallback("a", &["b", "c"]));

        assert_eq!(selector.fallback_list().as_slice(), ["a", "b", "c"]);
        selector.force_candidate("c");
        assert_eq!(selector.fallback_list().as_slice(), ["c", "a", "b"]);
        assert_eq!(selector.select_current().await, "c");
    }

    #[tokio::test]
    async fn force_candidate_clears_rejection() {
        let selector = DiscoveringModelSelector::new(Arc::new(ScriptedDiscovery::failing()))
            .with_fallback(fallback("a", &["b"]));

        assert_eq!(selector.select_current().await, "a");
        selector.invalidate();
        selector.force_candidate("a");
        assert_eq!(selector.cached().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn fixed_selector_reports_roster_and_counts_invalidations() {
        let selector = FixedModelSelector::new(["m1", "m2", "m3"]);
        assert_eq!(selector.select_current().await, "m1");
        assert_eq!(selector.fallback_list().len(), 3);

        selector.invalidate();
        selector.invalidate();
        assert_eq!(selector.invalidations(), 2);

        selector.force_candidate("m3");
        assert_eq!(selector.fallback_list().as_slice(), ["m3", "m1", "m2"]);
    }
}
