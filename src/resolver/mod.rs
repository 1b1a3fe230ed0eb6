//! Tiered explanation resolver.
//!
//! For each request the tiers are tried in a fixed order:
//!
//! 1. **cache** — a stored explanation is returned verbatim, whatever tier
//!    produced it;
//! 2. **mock** — when mock mode is forced or no API key is configured, a
//!    deterministic canned explanation is stored and returned;
//! 3. **live** — one chat completion, parsed as `{analogy, steps, code}`,
//!    tagged `ai`, stored and returned.
//!
//! Failures are never cached and never retried here. Concurrent live
//! resolutions of the same key are collapsed onto one upstream call.

mod inflight;
pub mod prompt;

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, ExplanationCache};
use crate::config::Config;
use crate::explain::{Explanation, ExplanationRequest, MissingField, Source, mock::mock_explain};
use crate::llm::{LlmProvider, ProviderError, providers};

use inflight::InFlight;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("Missing interest or concept ({0})")]
    Validation(#[from] MissingField),
    #[error("AI rate limit/quota exceeded: {0}")]
    Quota(String),
    #[error("Invalid model response: {0}")]
    MalformedResponse(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl ResolveError {
    /// HTTP status the API layer reports for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ResolveError::Validation(_) => 400,
            ResolveError::Quota(_) => 429,
            ResolveError::MalformedResponse(_) => 502,
            ResolveError::Upstream(_) => 500,
        }
    }
}

impl From<ProviderError> for ResolveError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Quota(m) => ResolveError::Quota(m),
            ProviderError::Request(m) => ResolveError::Upstream(m),
        }
    }
}

// ── Resolver ──────────────────────────────────────────────────────────────────

/// Produces the mock-tier explanation for a request. Swappable for tests.
pub type MockGenerator = Arc<dyn Fn(&ExplanationRequest) -> Explanation + Send + Sync>;

#[derive(Debug, Clone)]
enum Upstream {
    Mock,
    Live(LlmProvider),
}

pub struct Resolver {
    cache: ExplanationCache,
    upstream: Upstream,
    mock: MockGenerator,
    in_flight: InFlight,
}

impl Resolver {
    /// Resolver that never calls a model.
    pub fn mock() -> Self {
        Self::with_upstream(Upstream::Mock)
    }

    /// Resolver whose cache misses go to `provider`.
    pub fn live(provider: LlmProvider) -> Self {
        Self::with_upstream(Upstream::Live(provider))
    }

    fn with_upstream(upstream: Upstream) -> Self {
        Self {
            cache: ExplanationCache::new(),
            upstream,
            mock: Arc::new(mock_explain),
            in_flight: InFlight::default(),
        }
    }

    /// Pick the tier from config: mock when forced or keyless, else live.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        match (&config.openai_api_key, config.mock_ai) {
            (Some(key), false) => Ok(Self::live(providers::build(&config.llm, key.clone())?)),
            _ => Ok(Self::mock()),
        }
    }

    /// Replace the (empty) cache, e.g. to install an eviction policy.
    pub fn with_cache(mut self, cache: ExplanationCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_mock_generator(mut self, mock: MockGenerator) -> Self {
        self.mock = mock;
        self
    }

    pub fn cache(&self) -> &ExplanationCache {
        &self.cache
    }

    pub fn tier_name(&self) -> &'static str {
        match &self.upstream {
            Upstream::Mock => "mock",
            Upstream::Live(_) => "live",
        }
    }

    pub async fn resolve(&self, req: &ExplanationRequest) -> Result<Explanation, ResolveError> {
        req.validate()?;
        let key = CacheKey::from(req);

        if let Some(hit) = self.cache.get(&key) {
            debug!(%key, source = ?hit.source, "cache hit");
            return Ok(hit);
        }

        match &self.upstream {
            Upstream::Mock => {
                let value = self.cache.get_or_insert_with(key.clone(), || (self.mock)(req));
                debug!(%key, "served mock explanation");
                Ok(value)
            }
            Upstream::Live(provider) => self.resolve_live(key, req, provider).await,
        }
    }

    async fn resolve_live(
        &self,
        key: CacheKey,
        req: &ExplanationRequest,
        provider: &LlmProvider,
    ) -> Result<Explanation, ResolveError> {
        let slot = self.in_flight.acquire_slot(&key);
        let result = {
            let _guard = slot.lock().await;
            // Another caller may have filled the entry while we waited.
            match self.cache.get(&key) {
                Some(hit) => {
                    debug!(%key, "cache filled while waiting");
                    Ok(hit)
                }
                None => self
                    .generate(req, provider)
                    .await
                    .map(|value| self.cache.insert(key.clone(), value)),
            }
        };
        self.in_flight.release_slot(&key, slot);
        result
    }

    async fn generate(
        &self,
        req: &ExplanationRequest,
        provider: &LlmProvider,
    ) -> Result<Explanation, ResolveError> {
        let user = prompt::user_prompt(req.interest.trim(), req.concept.trim());
        let text = provider.complete(prompt::SYSTEM_PROMPT, &user).await.map_err(|e| {
            warn!(provider = provider.name(), error = %e, "live tier request failed");
            ResolveError::from(e)
        })?;
        let value = parse_generated(&text)?;
        info!(interest = %req.interest, concept = %req.concept, "generated explanation");
        Ok(value)
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Generated {
    analogy: String,
    steps: Vec<String>,
    code: String,
}

/// Parse model output into an `ai` explanation. Empty text, non-JSON, a
/// different shape, or blank required fields are all malformed.
fn parse_generated(text: &str) -> Result<Explanation, ResolveError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ResolveError::MalformedResponse("Empty model response".into()));
    }
    let g: Generated = serde_json::from_str(text)
        .map_err(|e| ResolveError::MalformedResponse(format!("Invalid JSON from model: {e}")))?;

    let value = Explanation {
        analogy: g.analogy,
        steps: g.steps,
        code: g.code,
        source: Source::Ai,
    };
    if !value.is_well_formed() {
        return Err(ResolveError::MalformedResponse(
            "model response has empty analogy, steps or code".into(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::llm::providers::scripted::{ScriptedProvider, ScriptedReply};

    const GOOD_JSON: &str = r#"{
        "analogy": "A stack is a pile of vinyl records.",
        "steps": ["Push a record", "Pop the top record", "Last in, first out"],
        "code": "const s: string[] = []; s.push('a'); s.pop();"
    }"#;

    fn scripted(reply: ScriptedReply) -> (Resolver, ScriptedProvider) {
        let p = ScriptedProvider::new(reply);
        (Resolver::live(LlmProvider::Scripted(p.clone())), p)
    }

    #[tokio::test]
    async fn mock_tier_is_idempotent() {
        let r = Resolver::mock();
        let req = ExplanationRequest::new("Music", "Stack");
        let a = r.resolve(&req).await.unwrap();
        let b = r.resolve(&req).await.unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
        assert_eq!(r.cache().len(), 1);
    }

    #[tokio::test]
    async fn cache_hit_returns_stored_value_not_fresh_mock() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let r = Resolver::mock().with_mock_generator(Arc::new(move |req: &ExplanationRequest| {
            let n = c.fetch_add(1, Ordering::SeqCst);
            Explanation {
                analogy: format!("{} #{n} (mock)", req.concept),
                steps: vec!["one".into()],
                code: format!("// mock {n}"),
                source: Source::Mock,
            }
        }));
        let req = ExplanationRequest::new("Dance", "Graph");
        let first = r.resolve(&req).await.unwrap();
        let second = r.resolve(&req).await.unwrap();
        assert_eq!(first.analogy, "Graph #0 (mock)");
        assert_eq!(second, first);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn music_stack_mock_end_to_end() {
        let e = Resolver::mock().resolve(&ExplanationRequest::new("Music", "Stack")).await.unwrap();
        assert_eq!(e.source, Source::Mock);
        assert!(e.analogy.contains("Stack"));
        assert!(e.analogy.contains("mock"));
        assert!(e.code.contains("mock"));
    }

    #[tokio::test]
    async fn blank_fields_are_validation_errors() {
        let r = Resolver::mock();
        let err = r.resolve(&ExplanationRequest::new("", "Stack")).await.unwrap_err();
        assert!(matches!(err, ResolveError::Validation(MissingField("interest"))));
        assert_eq!(err.http_status(), 400);

        let err = r.resolve(&ExplanationRequest::new("Music", "")).await.unwrap_err();
        assert!(matches!(err, ResolveError::Validation(MissingField("concept"))));
        assert!(r.cache().is_empty());
    }

    #[tokio::test]
    async fn live_success_is_tagged_ai_and_cached() {
        let (r, p) = scripted(ScriptedReply::Text(GOOD_JSON.into()));
        let req = ExplanationRequest::new("Music", "Stack");
        let e = r.resolve(&req).await.unwrap();
        assert_eq!(e.source, Source::Ai);
        assert_eq!(e.steps.len(), 3);

        let again = r.resolve(&req).await.unwrap();
        assert_eq!(again, e);
        assert_eq!(p.calls(), 1);
    }

    #[tokio::test]
    async fn empty_model_text_is_malformed_and_not_cached() {
        let (r, _) = scripted(ScriptedReply::Text(String::new()));
        let req = ExplanationRequest::new("Music", "Stack");
        let err = r.resolve(&req).await.unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse(_)));
        assert_eq!(err.http_status(), 502);
        assert!(!r.cache().contains(&CacheKey::from(&req)));
    }

    #[tokio::test]
    async fn non_json_and_wrong_shape_are_malformed() {
        for text in ["Sure! Here is your JSON:", r#"{"analogy": "x"}"#, r#"{"analogy":"","steps":["a"],"code":"c"}"#] {
            let (r, _) = scripted(ScriptedReply::Text(text.into()));
            let err = r.resolve(&ExplanationRequest::new("Poetry", "Queue")).await.unwrap_err();
            assert!(matches!(err, ResolveError::MalformedResponse(_)), "{text}: {err}");
        }
    }

    #[tokio::test]
    async fn malformed_response_is_retried_on_next_request() {
        let (r, p) = scripted(ScriptedReply::Text("not json".into()));
        let req = ExplanationRequest::new("Music", "Stack");
        assert!(r.resolve(&req).await.is_err());
        assert!(r.resolve(&req).await.is_err());
        assert_eq!(p.calls(), 2);
    }

    #[tokio::test]
    async fn quota_and_other_failures_are_classified() {
        let (r, _) = scripted(ScriptedReply::Quota("insufficient_quota".into()));
        let err = r.resolve(&ExplanationRequest::new("Music", "Stack")).await.unwrap_err();
        assert!(matches!(err, ResolveError::Quota(_)));
        assert_eq!(err.http_status(), 429);

        let (r, _) = scripted(ScriptedReply::Fail("connection reset".into()));
        let err = r.resolve(&ExplanationRequest::new("Music", "Stack")).await.unwrap_err();
        assert!(matches!(err, ResolveError::Upstream(_)));
        assert_eq!(err.http_status(), 500);
        assert!(r.cache().is_empty());
    }

    #[tokio::test]
    async fn cache_hit_precedes_live_tier() {
        let (r, p) = scripted(ScriptedReply::Fail("must not be called".into()));
        let req = ExplanationRequest::new("Music", "Stack");
        let seeded = mock_explain(&req);
        r.cache().insert(CacheKey::from(&req), seeded.clone());
        assert_eq!(r.resolve(&req).await.unwrap(), seeded);
        assert_eq!(p.calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_live_requests_share_one_upstream_call() {
        let p = ScriptedProvider::text(GOOD_JSON).with_delay(Duration::from_millis(50));
        let r = Arc::new(Resolver::live(LlmProvider::Scripted(p.clone())));
        let req = ExplanationRequest::new("Gaming", "Graph");

        let (a, b) = tokio::join!(r.resolve(&req), r.resolve(&req));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(p.calls(), 1);
        assert_eq!(r.in_flight.len(), 0);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_wait_on_each_other() {
        let p = ScriptedProvider::text(GOOD_JSON).with_delay(Duration::from_millis(20));
        let r = Resolver::live(LlmProvider::Scripted(p.clone()));
        let a = ExplanationRequest::new("Gaming", "Graph");
        let b = ExplanationRequest::new("Gaming", "Queue");
        let (x, y) = tokio::join!(r.resolve(&a), r.resolve(&b));
        assert!(x.is_ok() && y.is_ok());
        assert_eq!(p.calls(), 2);
        assert_eq!(r.cache().len(), 2);
    }

    #[test]
    fn from_config_picks_tier() {
        let mut config = Config::test_default();
        assert_eq!(Resolver::from_config(&config).unwrap().tier_name(), "mock");

        config.openai_api_key = Some("sk-test".into());
        assert_eq!(Resolver::from_config(&config).unwrap().tier_name(), "mock");

        config.mock_ai = false;
        assert_eq!(Resolver::from_config(&config).unwrap().tier_name(), "live");
    }
}
