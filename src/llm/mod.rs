//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! The `complete` method is `async fn` on the enum so callers need no
//! trait-object machinery.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// HTTP 429, or an `insufficient_quota` / `rate_limit_exceeded` error code.
    #[error("upstream quota or rate limit exceeded: {0}")]
    Quota(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
    Scripted(providers::scripted::ScriptedProvider),
}

impl LlmProvider {
    /// One round-trip: `system` instruction plus `user` message, returning
    /// the trimmed text of the first choice. Empty text is returned as `Ok`;
    /// deciding whether it is usable is the caller's job.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        match self {
            LlmProvider::OpenAiCompatible(p) => p.complete(system, user).await,
            LlmProvider::Scripted(p) => p.complete(system, user).await,
        }
    }

    /// Short provider label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::OpenAiCompatible(_) => "openai",
            LlmProvider::Scripted(_) => "scripted",
        }
    }
}
