//! Template store: one [`Template`] per [`Intent`], loaded once from the
//! JSON template document and read-only afterwards.
//!
//! Document shape:
//!
//! ```text
//! { "<intent>": { "description": "...", "rules": ["..."],
//!                 "example_prompt": "... {user_input} ...",
//!                 "examples": [{ "user_input": "...", "response": <any> }],
//!                 "common_feeling_prompt": "... {recommendations} ..." } }
//! ```
//!
//! Every key must name a known intent and every format string must parse;
//! either failure rejects the whole document.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::error::AdvisorError;
use super::intent::Intent;
use super::template::{FormatError, FormatString};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("invalid template document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown intent section '{0}'")]
    UnknownIntent(String),
    #[error("{intent}.{field}: {source}")]
    Format { intent: Intent, field: &'static str, source: FormatError },
}

/// One few-shot pair. `response` is whatever JSON the document holds:
/// an object for structured intents, a string for chat.
#[derive(Debug, Clone)]
pub struct Example {
    pub user_input: String,
    pub response: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct Template {
    pub description: String,
    /// Order matters: it steers the model.
    pub rules: Vec<String>,
    pub example_prompt: FormatString,
    pub examples: Vec<Example>,
    pub common_feeling_prompt: Option<FormatString>,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: HashMap<Intent, Template>,
}

#[derive(Deserialize)]
struct RawTemplate {
    description: String,
    rules: Vec<String>,
    example_prompt: String,
    #[serde(default)]
    examples: Vec<RawExample>,
    #[serde(default)]
    common_feeling_prompt: Option<String>,
}

#[derive(Deserialize)]
struct RawExample {
    user_input: String,
    response: serde_json::Value,
}

impl TemplateStore {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::from_json(&text)?;
        debug!(path = %path.display(), intents = ?store.intents(), "template document parsed");
        Ok(store)
    }

    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        // BTreeMap keeps error reporting deterministic across runs.
        let raw: BTreeMap<String, RawTemplate> = serde_json::from_str(text)?;

        let mut templates = HashMap::with_capacity(raw.len());
        for (key, raw) in raw {
            let intent: Intent = key.parse().map_err(|_| LoadError::UnknownIntent(key.clone()))?;
            templates.insert(intent, Template::from_raw(intent, raw)?);
        }
        Ok(Self { templates })
    }

    /// Look up the template for `intent`.
    pub fn get(&self, intent: Intent) -> Result<&Template, AdvisorError> {
        self.templates
            .get(&intent)
            .ok_or_else(|| AdvisorError::UnknownIntent(intent.as_str().to_string()))
    }

    /// Intents with a template, in declaration order.
    pub fn intents(&self) -> Vec<Intent> {
        Intent::ALL
            .into_iter()
            .filter(|i| self.templates.contains_key(i))
            .collect()
    }
}

impl Template {
    fn from_raw(intent: Intent, raw: RawTemplate) -> Result<Self, LoadError> {
        let parse = |field: &'static str, source: &str| {
            FormatString::parse(source).map_err(|source| LoadError::Format { intent, field, source })
        };

        Ok(Self {
            description: raw.description,
            rules: raw.rules,
            example_prompt: parse("example_prompt", &raw.example_prompt)?,
            examples: raw
                .examples
                .into_iter()
                .map(|e| Example { user_input: e.user_input, response: e.response })
                .collect(),
            common_feeling_prompt: raw
                .common_feeling_prompt
                .as_deref()
                .map(|s| parse("common_feeling_prompt", s))
                .transpose()?,
        })
    }
}
