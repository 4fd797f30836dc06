//! Offline provider: echoes the last block of the prompt back with an
//! `[echo]` prefix. Lets the server start without an API key.
//!
//! Composed prompts end with the request-specific block (the user turn for
//! chat, the filled example prompt otherwise), so that is what comes back.

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let last = prompt.trim().rsplit("\n\n").next().unwrap_or_default();
        Ok(format!("[echo] {}", last.trim()))
    }
}
