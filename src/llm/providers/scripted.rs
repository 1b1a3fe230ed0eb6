//! Scripted LLM provider — answers every request with a fixed reply.
//! Used to exercise the live tier without a real API key, including the
//! quota and malformed-response paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Quota(String),
    Fail(String),
}

#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    reply: ScriptedReply,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(reply: ScriptedReply) -> Self {
        Self { reply, delay: Duration::ZERO, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ScriptedReply::Text(text.into()))
    }

    /// Sleep before replying, so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Completed requests so far, shared across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            ScriptedReply::Text(t) => Ok(t.trim().to_string()),
            ScriptedReply::Quota(m) => Err(ProviderError::Quota(m.clone())),
            ScriptedReply::Fail(m) => Err(ProviderError::Request(m.clone())),
        }
    }
}
