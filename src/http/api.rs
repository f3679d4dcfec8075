//! Axum handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::AppState;
use crate::relay::RelayError;

/// Request body of `POST /generate`. A body that is not `application/json`
/// or does not parse into this shape is treated as a request without a prompt.
#[derive(Deserialize)]
pub(super) struct GenerateRequest {
    #[serde(default)]
    prompt: Option<Value>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::BadRequest => StatusCode::BAD_REQUEST,
            RelayError::GenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// POST /generate
pub(super) async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let request = payload
        .map(|Json(r)| r)
        .map_err(|e| debug!(status = %e.status(), "unreadable /generate body: {}", e.body_text()))
        .ok();
    let prompt = request
        .as_ref()
        .and_then(|r| r.prompt.as_ref())
        .and_then(Value::as_str);

    match state.relay.generate(prompt).await {
        Ok(script) => (StatusCode::OK, Json(json!({ "script": script }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /health
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let body = json!({
        "status": "ok",
        "provider": state.relay.provider().name(),
        "knowledge_entries": state.relay.knowledge().entries(),
    });
    (StatusCode::OK, Json(body)).into_response()
}
