//! Common-feeling summary: a second LLM call over a validated recommendation
//! set. The reply is returned as trimmed prose, never validated.

use std::collections::HashMap;

use tracing::debug;

use super::error::AdvisorError;
use super::intent::Intent;
use super::store::TemplateStore;
use super::types::RecommendationResponse;
use crate::llm::LlmProvider;

/// Placeholder the common-feeling template receives the set under.
pub const RECOMMENDATIONS_VAR: &str = "recommendations";

/// One line per item: `- <name> by <brand> (<line>): <reason> Best for: <situation>`.
pub fn render_recommendations(response: &RecommendationResponse) -> String {
    let mut out = String::new();
    for item in &response.recommendations {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("- {} by {} ({})", item.name, item.brand, item.line));
        if let Some(notes) = &item.notes {
            let notes: Vec<String> = notes.iter().map(|(pos, text)| format!("{pos}: {text}")).collect();
            out.push_str(&format!(" [{}]", notes.join("; ")));
        }
        out.push_str(&format!(": {} Best for: {}", item.reason, item.situation));
    }
    out
}

/// Prompt for an image generator, derived from a common-feeling summary.
pub fn image_prompt(common_feeling: &str) -> String {
    format!(
        "Generate an image based on the following natural or landscape feeling: {}",
        common_feeling.trim()
    )
}

/// Build the summary prompt without calling the gateway.
pub fn summary_prompt(
    store: &TemplateStore,
    intent: Intent,
    response: &RecommendationResponse,
) -> Result<String, AdvisorError> {
    let template = store
        .get(intent)?
        .common_feeling_prompt
        .as_ref()
        .ok_or(AdvisorError::UnsupportedForIntent(intent))?;

    let vars = HashMap::from([(RECOMMENDATIONS_VAR.to_string(), render_recommendations(response))]);
    template.render(&vars)
}

/// Summarize the overall feel of `response` with the intent's
/// common-feeling template.
pub async fn summarize(
    store: &TemplateStore,
    provider: &LlmProvider,
    intent: Intent,
    response: &RecommendationResponse,
) -> Result<String, AdvisorError> {
    let prompt = summary_prompt(store, intent, response)?;
    debug!(%intent, prompt_len = prompt.len(), "requesting common feeling");
    let text = provider.complete(&prompt).await?;
    Ok(text.trim().to_string())
}
