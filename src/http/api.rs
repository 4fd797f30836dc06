//! Axum handlers for `/api/*` routes.
//!
//! Every pipeline call runs under the configured request timeout. Failures
//! come back as `{ "error": <code>, "message": <text> }`.

use std::future::Future;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::HttpState;
use crate::advisor::{AdvisorError, Intent, RecommendRequest, Recommendation, Reply};

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct ChatBody {
    user_input: String,
}

#[derive(Deserialize)]
pub(super) struct RecommendBody {
    user_input: String,
    intent: Option<String>,
    interior_description: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn json_error(status: StatusCode, code: &str, msg: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "error": code, "message": format!("{msg}") }))).into_response()
}

fn status_for(err: &AdvisorError) -> StatusCode {
    if err.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::BAD_REQUEST
    }
}

fn blank_input() -> Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_request", "user_input must not be empty")
}

/// Run one pipeline call under the request timeout and map its failure.
async fn guarded<T>(
    state: &HttpState,
    request_id: Uuid,
    route: &'static str,
    fut: impl Future<Output = Result<T, AdvisorError>>,
) -> Result<T, Response> {
    match tokio::time::timeout(state.request_timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(%request_id, route, code = e.code(), "request failed: {e}");
            Err(json_error(status_for(&e), e.code(), e))
        }
        Err(_) => {
            warn!(%request_id, route, "request timed out");
            Err(json_error(StatusCode::GATEWAY_TIMEOUT, "timeout", "LLM request timed out"))
        }
    }
}

fn chat_body(response: String) -> Response {
    (StatusCode::OK, Json(json!({ "mode": "chat", "response": response }))).into_response()
}

fn recommendation_body(rec: Recommendation) -> Response {
    let body = json!({
        "mode": "recommendation",
        "intent": rec.intent,
        "recommendations": rec.recommendations,
        "content": rec.content,
        "common_feeling": rec.common_feeling,
        "image_prompt": rec.image_prompt,
    });
    (StatusCode::OK, Json(body)).into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<HttpState>) -> Response {
    let intents: Vec<&str> = state
        .advisor
        .templates()
        .intents()
        .into_iter()
        .map(Intent::as_str)
        .collect();
    let body = json!({
        "status": "ok",
        "intents": intents,
        "provider": state.advisor.provider().name(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/chat
pub(super) async fn chat(State(state): State<HttpState>, Json(req): Json<ChatBody>) -> Response {
    if req.user_input.trim().is_empty() {
        return blank_input();
    }
    let request_id = Uuid::new_v4();
    info!(%request_id, route = "chat", "request received");

    match guarded(&state, request_id, "chat", state.advisor.chat(&req.user_input)).await {
        Ok(reply) => chat_body(reply),
        Err(resp) => resp,
    }
}

/// POST /api/recommend. `intent` defaults to `recommendation`.
pub(super) async fn recommend(
    State(state): State<HttpState>,
    Json(req): Json<RecommendBody>,
) -> Response {
    if req.user_input.trim().is_empty() {
        return blank_input();
    }
    let intent = match req.intent.as_deref() {
        None => Intent::Recommendation,
        Some(name) => match name.parse::<Intent>() {
            Ok(intent) => intent,
            Err(e) => return json_error(StatusCode::BAD_REQUEST, e.code(), e),
        },
    };
    let request_id = Uuid::new_v4();
    info!(%request_id, route = "recommend", %intent, "request received");

    let request = RecommendRequest {
        user_input: req.user_input,
        interior_description: req.interior_description,
    };
    match guarded(&state, request_id, "recommend", state.advisor.recommend(intent, &request)).await {
        Ok(rec) => recommendation_body(rec),
        Err(resp) => resp,
    }
}

/// POST /api/process-input: classify, then answer as chat or recommendation.
pub(super) async fn process_input(
    State(state): State<HttpState>,
    Json(req): Json<RecommendBody>,
) -> Response {
    if req.user_input.trim().is_empty() {
        return blank_input();
    }
    let request_id = Uuid::new_v4();
    info!(%request_id, route = "process-input", "request received");

    let request = RecommendRequest {
        user_input: req.user_input,
        interior_description: req.interior_description,
    };
    match guarded(&state, request_id, "process-input", state.advisor.process(&request)).await {
        Ok(Reply::Chat(reply)) => chat_body(reply),
        Ok(Reply::Recommendation(rec)) => recommendation_body(rec),
        Err(resp) => resp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderError;

    #[test]
    fn caller_errors_map_to_400() {
        assert_eq!(status_for(&AdvisorError::UnknownIntent("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AdvisorError::MissingPlaceholder("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&AdvisorError::UnsupportedForIntent(Intent::Chat)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AdvisorError::EmptyCatalog(crate::advisor::ProductKind::Perfume)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn upstream_errors_map_to_502() {
        assert_eq!(status_for(&AdvisorError::MalformedResponse("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&AdvisorError::MissingField { index: 0, field: "name" }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&ProviderError::Request("down".into()).into()),
            StatusCode::BAD_GATEWAY
        );
    }
}
