//! Scripted LLM provider: replays queued replies in order and records every
//! prompt it receives.
//!
//! Drives the full compose → complete → validate pipeline offline, and lets
//! tests assert whether the gateway was reached at all.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::llm::ProviderError;

#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    inner: Arc<Script>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct Script {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedProvider {
    /// Queue `replies` to be returned by successive `complete` calls.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let p = Self::default();
        for r in replies {
            p.push_reply(r);
        }
        p
    }

    /// Sleep for `delay` before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        lock(&self.inner.replies).push_back(Ok(reply.into()));
    }

    /// Queue a provider failure (surfaces as `ProviderError::Request`).
    pub fn push_failure(&self, message: impl Into<String>) {
        lock(&self.inner.replies).push_back(Err(message.into()));
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        lock(&self.inner.prompts).len()
    }

    /// Every prompt received, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.inner.prompts).clone()
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        lock(&self.inner.prompts).push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match lock(&self.inner.replies).pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(ProviderError::Request(message)),
            None => Err(ProviderError::Request("scripted provider has no replies left".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_and_records_prompts() {
        let p = ScriptedProvider::new(["one", "two"]);
        assert_eq!(p.complete("a").await.unwrap(), "one");
        assert_eq!(p.complete("b").await.unwrap(), "two");
        assert_eq!(p.prompts(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(p.calls(), 2);
    }

    #[tokio::test]
    async fn exhausted_script_fails() {
        let p = ScriptedProvider::default();
        assert!(p.complete("x").await.is_err());
        assert_eq!(p.calls(), 1);
    }

    #[tokio::test]
    async fn queued_failure_surfaces() {
        let p = ScriptedProvider::default();
        p.push_failure("rate limited");
        let err = p.complete("x").await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn clones_share_the_script() {
        let p = ScriptedProvider::new(["shared"]);
        let clone = p.clone();
        assert_eq!(clone.complete("x").await.unwrap(), "shared");
        assert_eq!(p.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_applies_before_reply() {
        let p = ScriptedProvider::new(["late"]).with_delay(Duration::from_secs(5));
        let start = tokio::time::Instant::now();
        assert_eq!(p.complete("x").await.unwrap(), "late");
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
