//! Prompt composition.
//!
//! A composed prompt is a stack of blocks joined by blank lines:
//!
//! ```text
//! <description>
//!
//! Rules:
//! <rule 1>
//! <rule 2>
//!
//! Examples:
//! Q: <example input>
//! A: <example response>
//!
//! <example_prompt with placeholders filled>
//! ```
//!
//! Empty blocks are skipped. Rule and example order follow the template.
//! The filled `example_prompt` is kept byte-for-byte, so substituted values
//! survive with their surrounding whitespace.

use std::collections::HashMap;
use std::fmt;

use super::error::AdvisorError;
use super::intent::Intent;
use super::store::{Example, Template, TemplateStore};

const SEPARATOR: &str = "\n\n";

/// Final text for one LLM call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    intent: Intent,
    text: String,
}

impl ComposedPrompt {
    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for ComposedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Accumulates non-empty blocks. Static blocks are trimmed; rendered ones
/// are not.
#[derive(Default)]
struct PromptBuilder {
    parts: Vec<String>,
}

impl PromptBuilder {
    fn append(mut self, text: &str) -> Self {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.parts.push(trimmed.to_string());
        }
        self
    }

    fn append_verbatim(mut self, text: &str) -> Self {
        if !text.trim().is_empty() {
            self.parts.push(text.to_string());
        }
        self
    }

    fn rules(self, rules: &[String]) -> Self {
        let lines: Vec<&str> = rules.iter().map(|r| r.trim()).filter(|r| !r.is_empty()).collect();
        if lines.is_empty() {
            return self;
        }
        self.append(&format!("Rules:\n{}", lines.join("\n")))
    }

    fn examples(self, examples: &[Example]) -> Self {
        if examples.is_empty() {
            return self;
        }
        let pairs: Vec<String> = examples
            .iter()
            .map(|e| format!("Q: {}\nA: {}", e.user_input.trim(), render_response(&e.response)))
            .collect();
        self.append(&format!("Examples:\n{}", pairs.join("\n\n")))
    }

    fn build(self) -> String {
        self.parts.join(SEPARATOR)
    }
}

/// Strings are shown as-is; structured responses as pretty JSON so the model
/// sees the exact shape it must produce.
fn render_response(response: &serde_json::Value) -> String {
    match response {
        serde_json::Value::String(s) => s.trim().to_string(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

impl Template {
    /// Compose this template with `vars`. Fails before producing any text if
    /// a referenced placeholder has no value.
    pub fn compose(&self, vars: &HashMap<String, String>) -> Result<String, AdvisorError> {
        let body = self.example_prompt.render(vars)?;
        Ok(PromptBuilder::default()
            .append(&self.description)
            .rules(&self.rules)
            .examples(&self.examples)
            .append_verbatim(&body)
            .build())
    }
}

impl TemplateStore {
    /// Look up the template for `intent` and compose it.
    pub fn compose(
        &self,
        intent: Intent,
        vars: &HashMap<String, String>,
    ) -> Result<ComposedPrompt, AdvisorError> {
        let text = self.get(intent)?.compose(vars)?;
        Ok(ComposedPrompt { intent, text })
    }
}
