//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory — called at startup, and only
//! when the live tier is enabled.

pub mod openai_compatible;
pub mod scripted;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct the live provider from config and the API key.
///
/// `api_key` is sourced from `OPENAI_API_KEY` env (never TOML).
pub fn build(config: &LlmConfig, api_key: String) -> Result<LlmProvider, ProviderError> {
    let oai = &config.openai;
    let p = openai_compatible::OpenAiCompatibleProvider::new(
        oai.api_base_url.clone(),
        oai.model.clone(),
        oai.temperature,
        oai.timeout_seconds,
        Some(api_key),
    )?;
    Ok(LlmProvider::OpenAiCompatible(p))
}
