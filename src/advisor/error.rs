use thiserror::Error;

use super::catalog::ProductKind;
use super::intent::Intent;
use crate::llm::ProviderError;

/// Request-level failures of the recommendation core.
///
/// Composer and validator errors are local-input errors and are never
/// retried here. `GatewayFailure` passes provider errors through untouched.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("unknown intent: '{0}'")]
    UnknownIntent(String),

    #[error("missing value for placeholder {{{0}}}")]
    MissingPlaceholder(String),

    #[error("malformed LLM response: {0}")]
    MalformedResponse(String),

    #[error("expected {expected} recommendations, got {actual}")]
    CardinalityMismatch { expected: usize, actual: usize },

    #[error("recommendation {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("operation not supported for intent '{0}'")]
    UnsupportedForIntent(Intent),

    #[error("catalog has no {0} products")]
    EmptyCatalog(ProductKind),

    #[error("LLM gateway failure: {0}")]
    GatewayFailure(#[from] ProviderError),
}

impl AdvisorError {
    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AdvisorError::UnknownIntent(_) => "unknown_intent",
            AdvisorError::MissingPlaceholder(_) => "missing_placeholder",
            AdvisorError::MalformedResponse(_) => "malformed_response",
            AdvisorError::CardinalityMismatch { .. } => "cardinality_mismatch",
            AdvisorError::MissingField { .. } => "missing_field",
            AdvisorError::UnsupportedForIntent(_) => "unsupported_for_intent",
            AdvisorError::EmptyCatalog(_) => "empty_catalog",
            AdvisorError::GatewayFailure(_) => "gateway_failure",
        }
    }

    /// `true` when the provider, not the caller, produced the failure.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AdvisorError::MalformedResponse(_)
                | AdvisorError::CardinalityMismatch { .. }
                | AdvisorError::MissingField { .. }
                | AdvisorError::GatewayFailure(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_display_keeps_braces() {
        let e = AdvisorError::MissingPlaceholder("perfumes_text".into());
        assert_eq!(e.to_string(), "missing value for placeholder {perfumes_text}");
    }

    #[test]
    fn missing_field_display() {
        let e = AdvisorError::MissingField { index: 1, field: "grade" };
        assert_eq!(e.to_string(), "recommendation 1 is missing required field 'grade'");
        assert_eq!(e.code(), "missing_field");
    }

    #[test]
    fn gateway_failure_wraps_provider_error() {
        let e: AdvisorError = ProviderError::Request("timeout".into()).into();
        assert!(matches!(e, AdvisorError::GatewayFailure(_)));
        assert!(e.to_string().contains("timeout"));
        assert!(e.is_upstream());
    }

    #[test]
    fn caller_errors_are_not_upstream() {
        assert!(!AdvisorError::UnknownIntent("x".into()).is_upstream());
        assert!(!AdvisorError::UnsupportedForIntent(Intent::Chat).is_upstream());
        assert!(AdvisorError::CardinalityMismatch { expected: 3, actual: 2 }.is_upstream());
    }
}
