//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! Always requests JSON-object output. All OpenAI wire types are private to
//! this module — callers only see the reply text or a [`ProviderError`].

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::ProviderError;

/// Error codes that mean "try again later" rather than "broken request".
const QUOTA_CODES: &[&str] = &["insufficient_quota", "rate_limit_exceeded"];

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions`.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from config values and an optional API key, sent as
    /// `Authorization: Bearer <key>` when present.
    pub fn new(
        api_base_url: String,
        model: String,
        temperature: f32,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, temperature, api_key })
    }

    /// Send one system + user exchange and return the first choice's text,
    /// trimmed. A missing choice or null content yields an empty string.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message { role: "system".to_string(), content: system.to_string() },
                Message { role: "user".to_string(), content: user.to_string() },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat { kind: "json_object".to_string() },
        };

        debug!(
            model = %payload.model,
            temperature = payload.temperature,
            content_len = user.len(),
            "sending LLM request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full LLM request payload");
        }

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.api_base_url, error = %e, "LLM HTTP request failed (transport)");
            ProviderError::Request(e.to_string())
        })?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize LLM response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(choices = parsed.choices.len(), "received LLM response");

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default())
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a classified error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let (message, code) = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(env) => {
            let code = env.error.code.map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
            let suffix = code.as_deref().map(|c| format!(" [code={c}]")).unwrap_or_default();
            (format!("HTTP {status}{suffix}: {}", env.error.message), code)
        }
        Err(_) => (format!("HTTP {status}: {body}"), None),
    };

    let is_quota = status == StatusCode::TOO_MANY_REQUESTS
        || code.as_deref().is_some_and(|c| QUOTA_CODES.contains(&c));

    error!(%status, %message, quota = is_quota, "LLM request returned HTTP error");
    if is_quota {
        Err(ProviderError::Quota(message))
    } else {
        Err(ProviderError::Request(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, http::StatusCode as AxumStatus, routing::post};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    /// Serve `reply` at `/v1/chat/completions` on an ephemeral port and
    /// record each request body. Returns the endpoint URL.
    async fn fake_openai(status: u16, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = seen.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<Value>| {
                let seen = seen_in.clone();
                let reply = reply.clone();
                async move {
                    seen.lock().unwrap().push(body);
                    (AxumStatus::from_u16(status).unwrap(), Json(reply))
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}/v1/chat/completions"), seen)
    }

    fn provider(url: String) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(url, "gpt-4.1-mini".into(), 0.7, 5, Some("sk-test".into())).unwrap()
    }

    #[tokio::test]
    async fn returns_first_choice_trimmed() {
        let (url, seen) = fake_openai(
            200,
            json!({ "choices": [ { "message": { "content": "  {\"analogy\":\"x\"}\n" } } ] }),
        )
        .await;
        let text = provider(url).complete("sys", "explain").await.unwrap();
        assert_eq!(text, "{\"analogy\":\"x\"}");

        let body = seen.lock().unwrap()[0].clone();
        assert_eq!(body["model"], "gpt-4.1-mini");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "explain");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn missing_content_is_empty_text() {
        let (url, _) = fake_openai(200, json!({ "choices": [ { "message": { "content": null } } ] })).await;
        assert_eq!(provider(url).complete("s", "u").await.unwrap(), "");

        let (url, _) = fake_openai(200, json!({ "choices": [] })).await;
        assert_eq!(provider(url).complete("s", "u").await.unwrap(), "");
    }

    #[tokio::test]
    async fn status_429_is_quota() {
        let (url, _) = fake_openai(429, json!({ "error": { "message": "slow down" } })).await;
        let err = provider(url).complete("s", "u").await.unwrap_err();
        assert!(matches!(err, ProviderError::Quota(_)), "{err}");
    }

    #[tokio::test]
    async fn insufficient_quota_code_is_quota() {
        let (url, _) = fake_openai(
            403,
            json!({ "error": { "message": "billing", "code": "insufficient_quota" } }),
        )
        .await;
        let err = provider(url).complete("s", "u").await.unwrap_err();
        match err {
            ProviderError::Quota(msg) => assert!(msg.contains("insufficient_quota")),
            other => panic!("expected quota, got {other}"),
        }
    }

    #[tokio::test]
    async fn other_http_errors_are_request_errors() {
        let (url, _) = fake_openai(401, json!({ "error": { "message": "bad key", "code": "invalid_api_key" } })).await;
        let err = provider(url).complete("s", "u").await.unwrap_err();
        match err {
            ProviderError::Request(msg) => assert!(msg.contains("bad key")),
            other => panic!("expected request error, got {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = provider(format!("http://{addr}/v1/chat/completions"))
            .complete("s", "u")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
    }
}
