//! Configuration loading with env-var overrides.
//!
//! Layers, lowest first: built-in defaults, an optional TOML file
//! (`config/default.toml` when present, or an explicit `-f` path which must
//! exist), then `PORT`, `MOCK_AI`, `OPENAI_API_KEY` and
//! `PASSIONDSA_LOG_LEVEL` from the environment.

use std::{
    env, fs,
    path::Path,
};

use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    /// Listen port. `PORT` overrides the TOML value.
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// OpenAI / OpenAI-compatible provider configuration (`[llm.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub openai: OpenAiConfig,
}

/// Fully-resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub log_level: String,
    /// `MOCK_AI=1` (or `mock_ai = true`) forces the mock tier.
    pub mock_ai: bool,
    pub llm: LlmConfig,
    /// From `OPENAI_API_KEY` only, never TOML. Empty counts as absent.
    pub openai_api_key: Option<String>,
}

impl Config {
    /// The mock tier is used when forced, or when there is no credential.
    pub fn mock_tier_forced(&self) -> bool {
        self.mock_ai || self.openai_api_key.is_none()
    }
}

/// Environment-sourced values. Tests build this directly instead of
/// mutating the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub port: Option<String>,
    pub mock_ai: Option<String>,
    pub openai_api_key: Option<String>,
    pub log_level: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT").ok(),
            mock_ai: env::var("MOCK_AI").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            log_level: env::var("PASSIONDSA_LOG_LEVEL").ok(),
        }
    }
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    mock_ai: bool,
}

impl Default for RawServer {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            mock_ai: false,
        }
    }
}

#[derive(Deserialize, Default)]
struct RawLlm {
    #[serde(default)]
    openai: RawOpenAiConfig,
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8787 }
fn default_log_level() -> String { "info".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4.1-mini".to_string() }
fn default_openai_temperature() -> f32 { 0.7 }
fn default_openai_timeout_seconds() -> u64 { 60 }

/// Load config from `path` (or the default file when present), then apply
/// the process environment.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();
    match path {
        Some(p) => load_from(Some(Path::new(p)), &overrides),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            load_from(default.exists().then_some(default), &overrides)
        }
    }
}

/// Internal loader — accepts an explicit optional file and overrides.
/// A `Some` path that cannot be read is an error.
pub fn load_from(path: Option<&Path>, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let parsed: RawConfig = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
            toml::from_str(&raw)
                .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?
        }
        None => RawConfig::default(),
    };

    let port = match overrides.port.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("invalid PORT '{p}': {e}")))?,
        _ => parsed.server.port,
    };

    // Only the literal "1" forces mock mode from the environment.
    let mock_ai = parsed.server.mock_ai || overrides.mock_ai.as_deref() == Some("1");

    let openai_api_key = overrides
        .openai_api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string);

    let log_level = overrides
        .log_level
        .clone()
        .unwrap_or(parsed.server.log_level);

    let o = parsed.llm.openai;
    Ok(Config {
        server: ServerConfig { host: parsed.server.host, port },
        log_level,
        mock_ai,
        llm: LlmConfig {
            openai: OpenAiConfig {
                api_base_url: o.api_base_url,
                model: o.model,
                temperature: o.temperature,
                timeout_seconds: o.timeout_seconds,
            },
        },
        openai_api_key,
    })
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — mock tier, no API key, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            server: ServerConfig { host: "127.0.0.1".into(), port: 0 },
            log_level: "info".into(),
            mock_ai: true,
            llm: LlmConfig {
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.7,
                    timeout_seconds: 1,
                },
            },
            openai_api_key: None,
        }
    }
}
