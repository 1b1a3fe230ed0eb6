//! Client side: fetch an explanation from the resolver, or fall back to the
//! offline generator when that fails.
//!
//! [`Presenter::present`] runs the fetch as one task raced against a
//! [`CancellationToken`] owned by the caller. Cancelling abandons the
//! request; nothing is rendered. Any failure (transport, non-2xx, bad body)
//! produces a degraded [`Presentation`] built by
//! [`local_explain`](crate::explain::local::local_explain). The fallback is
//! never used while a network call is still possible.

pub mod render;
pub mod selection;
pub mod visualizer;

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::explain::local::local_explain;
use crate::explain::{Concept, Explanation, ExplanationRequest, Interest};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8787/api";

/// Shown to the user whenever the local fallback is used.
pub const DEGRADED_NOTICE: &str = "Using local explanation (AI unavailable).";

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Thin HTTP client for `POST {api_url}/explain`.
#[derive(Debug, Clone)]
pub struct ExplainClient {
    client: Client,
    endpoint: String,
}

impl ExplainClient {
    /// `api_url` is the API prefix, e.g. `http://127.0.0.1:8787/api`.
    /// `timeout` of `None` leaves reqwest's default (no overall timeout).
    pub fn new(api_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().map_err(|e| ClientError::Build(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/explain", api_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn explain(&self, req: &ExplanationRequest) -> Result<Explanation, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(req)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(_) => status.canonical_reason().unwrap_or_default().to_string(),
            };
            return Err(ClientError::Status { status: status.as_u16(), body });
        }

        response
            .json::<Explanation>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

// ── Presentation ──────────────────────────────────────────────────────────────

/// What the UI shows for one (interest, concept) selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub interest: Interest,
    pub concept: Concept,
    pub explanation: Explanation,
    /// Set in degraded mode.
    pub notice: Option<String>,
}

impl Presentation {
    pub fn is_degraded(&self) -> bool {
        self.notice.is_some()
    }
}

pub struct Presenter {
    client: ExplainClient,
}

impl Presenter {
    pub fn new(client: ExplainClient) -> Self {
        Self { client }
    }

    /// Fetch and present, or `None` if `cancel` fires first.
    pub async fn present(
        &self,
        interest: Interest,
        concept: Concept,
        cancel: &CancellationToken,
    ) -> Option<Presentation> {
        let req = ExplanationRequest::from((interest, concept));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%interest, %concept, "explain request abandoned");
                None
            }
            result = self.client.explain(&req) => Some(match result {
                Ok(explanation) => Presentation { interest, concept, explanation, notice: None },
                Err(e) => {
                    warn!(%interest, %concept, error = %e, "resolver unavailable, using local explanation");
                    Presentation {
                        interest,
                        concept,
                        explanation: local_explain(interest, concept),
                        notice: Some(DEGRADED_NOTICE.to_string()),
                    }
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{Router, http::StatusCode, routing::post};
    use tokio::net::TcpListener;

    use crate::explain::Source;
    use crate::resolver::Resolver;

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    async fn dead_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/api")
    }

    fn presenter(url: &str) -> Presenter {
        Presenter::new(ExplainClient::new(url, Some(Duration::from_secs(5))).unwrap())
    }

    #[test]
    fn endpoint_joins_cleanly() {
        let c = ExplainClient::new("http://localhost:8787/api/", None).unwrap();
        assert_eq!(c.endpoint(), "http://localhost:8787/api/explain");
    }

    #[tokio::test]
    async fn server_result_is_shown_as_is() {
        let url = spawn(crate::server::build_router(Arc::new(Resolver::mock()))).await;
        let p = presenter(&url)
            .present(Interest::Music, Concept::Stack, &CancellationToken::new())
            .await
            .unwrap();
        assert!(!p.is_degraded());
        assert_eq!(p.explanation.source, Source::Mock);
        assert!(p.explanation.analogy.contains("Stack"));
    }

    #[tokio::test]
    async fn network_failure_falls_back_to_local() {
        let url = dead_url().await;
        let p = presenter(&url)
            .present(Interest::Dance, Concept::Queue, &CancellationToken::new())
            .await
            .unwrap();
        assert!(p.is_degraded());
        assert_eq!(p.notice.as_deref(), Some(DEGRADED_NOTICE));
        assert_eq!(p.explanation.source, Source::Local);
        assert!(p.explanation.code.contains("push"));
        assert!(p.explanation.code.contains("shift"));
    }

    #[tokio::test]
    async fn error_status_falls_back_to_local() {
        let router = Router::new().route(
            "/api/explain",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota") }),
        );
        let url = spawn(router).await;
        let p = presenter(&url)
            .present(Interest::Poetry, Concept::Graph, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(p.explanation, local_explain(Interest::Poetry, Concept::Graph));
        assert!(p.is_degraded());
    }

    #[tokio::test]
    async fn undecodable_body_is_decode_error() {
        let router = Router::new().route("/api/explain", post(|| async { "not json" }));
        let url = spawn(router).await;
        let err = ExplainClient::new(&url, None)
            .unwrap()
            .explain(&ExplanationRequest::new("Music", "Stack"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn status_error_carries_body() {
        let router = Router::new().route(
            "/api/explain",
            post(|| async { (StatusCode::BAD_GATEWAY, "{\"error\":\"Empty model response\"}") }),
        );
        let url = spawn(router).await;
        let err = ExplainClient::new(&url, None)
            .unwrap()
            .explain(&ExplanationRequest::new("Music", "Stack"))
            .await
            .unwrap_err();
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 502);
                assert!(body.contains("Empty model response"));
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[tokio::test]
    async fn cancelled_request_renders_nothing() {
        let router = Router::new().route(
            "/api/explain",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "late"
            }),
        );
        let url = spawn(router).await;
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });
        let p = presenter(&url).present(Interest::Music, Concept::Stack, &cancel).await;
        assert!(p.is_none());
    }

    #[tokio::test]
    async fn already_cancelled_skips_the_request() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let url = dead_url().await;
        assert!(presenter(&url).present(Interest::Music, Concept::Stack, &cancel).await.is_none());
    }
}
