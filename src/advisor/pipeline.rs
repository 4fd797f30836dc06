//! Request orchestration: compose → complete → validate → summarize.
//!
//! `Advisor` is cheap to clone and holds only read-only state, so one
//! instance serves every request concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::catalog::Catalog;
use super::classify::{classification_prompt, parse_intent_reply};
use super::error::AdvisorError;
use super::intent::Intent;
use super::store::TemplateStore;
use super::summarize::{image_prompt, summarize};
use super::types::RecommendationItem;
use super::validate::validate;
use crate::llm::LlmProvider;

const USER_INPUT: &str = "user_input";
const PERFUMES_TEXT: &str = "perfumes_text";
const INTERIOR_DESCRIPTION: &str = "interior_description";

#[derive(Debug, Clone, Default)]
pub struct RecommendRequest {
    pub user_input: String,
    pub interior_description: Option<String>,
}

impl RecommendRequest {
    pub fn new(user_input: impl Into<String>) -> Self {
        Self { user_input: user_input.into(), interior_description: None }
    }

    pub fn with_interior(mut self, description: impl Into<String>) -> Self {
        self.interior_description = Some(description.into());
        self
    }
}

/// Validated recommendation set plus its optional prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub intent: Intent,
    pub recommendations: Vec<RecommendationItem>,
    pub content: Option<String>,
    pub common_feeling: Option<String>,
    /// Image-generation prompt built from `common_feeling`.
    pub image_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Chat(String),
    Recommendation(Recommendation),
}

#[derive(Debug, Clone)]
pub struct Advisor {
    templates: Arc<TemplateStore>,
    catalog: Arc<Catalog>,
    provider: LlmProvider,
    catalog_limit: usize,
}

impl Advisor {
    pub fn new(
        templates: Arc<TemplateStore>,
        catalog: Arc<Catalog>,
        provider: LlmProvider,
        catalog_limit: usize,
    ) -> Self {
        Self { templates, catalog, provider, catalog_limit }
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// Free-form conversation. The reply is returned as prose.
    pub async fn chat(&self, user_input: &str) -> Result<String, AdvisorError> {
        let template = self.templates.get(Intent::Chat)?;
        let vars = HashMap::from([(USER_INPUT.to_string(), user_input.trim().to_string())]);
        let mut prompt = self.templates.compose(Intent::Chat, &vars)?.into_string();
        if !template.example_prompt.references(USER_INPUT) {
            prompt.push_str(&format!("\n\nUser: {}", user_input.trim()));
        }

        debug!(prompt_len = prompt.len(), "chat prompt composed");
        let reply = self.provider.complete(&prompt).await?;
        Ok(reply.trim().to_string())
    }

    /// Structured recommendation for `intent`. Chat is not a recommendation
    /// intent and fails with `UnsupportedForIntent`.
    pub async fn recommend(
        &self,
        intent: Intent,
        request: &RecommendRequest,
    ) -> Result<Recommendation, AdvisorError> {
        let kind = intent.product_kind().ok_or(AdvisorError::UnsupportedForIntent(intent))?;
        let template = self.templates.get(intent)?;

        let mut vars = HashMap::from([(USER_INPUT.to_string(), request.user_input.trim().to_string())]);
        if template.example_prompt.references(PERFUMES_TEXT) {
            vars.insert(PERFUMES_TEXT.to_string(), self.catalog.render(kind, self.catalog_limit)?);
        }
        if let Some(interior) = request.interior_description.as_deref() {
            vars.insert(INTERIOR_DESCRIPTION.to_string(), interior.trim().to_string());
        }

        let prompt = self.templates.compose(intent, &vars)?;
        debug!(%intent, prompt_len = prompt.as_str().len(), "recommendation prompt composed");

        let raw = self.provider.complete(prompt.as_str()).await?;
        debug!(%intent, raw_len = raw.len(), "recommendation reply received");

        let response = validate(intent, &raw)?;
        let common_feeling = if template.common_feeling_prompt.is_some() {
            Some(summarize(&self.templates, &self.provider, intent, &response).await?)
        } else {
            None
        };

        info!(%intent, items = response.recommendations.len(), "recommendation ready");
        Ok(Recommendation {
            intent,
            recommendations: response.recommendations,
            content: response.content,
            image_prompt: common_feeling.as_deref().map(image_prompt),
            common_feeling,
        })
    }

    pub async fn classify(&self, user_input: &str) -> Result<Intent, AdvisorError> {
        let reply = self.provider.complete(&classification_prompt(user_input)).await?;
        let intent = parse_intent_reply(&reply);
        debug!(%intent, reply = %reply.trim(), "intent classified");
        Ok(intent)
    }

    /// Classify `user_input` and route it to chat or a recommendation.
    ///
    /// A diffuser request without a separate interior description uses the
    /// message itself: the classifier only picks that intent when the
    /// message describes a space.
    pub async fn process(&self, request: &RecommendRequest) -> Result<Reply, AdvisorError> {
        match self.classify(&request.user_input).await? {
            Intent::Chat => self.chat(&request.user_input).await.map(Reply::Chat),
            Intent::DiffuserRecommendation if request.interior_description.is_none() => {
                let request = request.clone().with_interior(request.user_input.clone());
                self.recommend(Intent::DiffuserRecommendation, &request)
                    .await
                    .map(Reply::Recommendation)
            }
            intent => self.recommend(intent, request).await.map(Reply::Recommendation),
        }
    }
}
