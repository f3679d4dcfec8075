//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! History turns become `user` / `assistant` messages ahead of the live turn.
//! `top_k` has no equivalent in this API and is not sent.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{ChatTurn, GenerationConfig, ProviderError, Role};

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions`:
/// OpenAI itself, local servers (Ollama, LM Studio, llama.cpp) and hosted
/// alternatives.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        api_base_url: String,
        model: String,
        timeout_seconds: u64,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, api_key })
    }

    pub async fn generate(
        &self,
        history: &[ChatTurn],
        message: &str,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError> {
        let payload = request_body(&self.model, history, message, config);

        debug!(
            model = %payload.model,
            temperature = payload.temperature,
            message_len = message.len(),
            "sending LLM request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full LLM request payload");
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_base_url, error = %e, "LLM HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize LLM response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(choices = parsed.choices.len(), "received LLM response");

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProviderError::Request("empty or missing content in response".into()))
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

fn request_body(
    model: &str,
    history: &[ChatTurn],
    message: &str,
    config: &GenerationConfig,
) -> ChatCompletionRequest {
    let mut messages: Vec<Message> = history
        .iter()
        .map(|turn| Message {
            role: match turn.role {
                Role::User => "user",
                Role::Model => "assistant",
            },
            content: turn.text.clone(),
        })
        .collect();
    messages.push(Message { role: "user", content: message.to_string() });

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        temperature: config.temperature,
        top_p: config.top_p,
        max_tokens: config.max_output_tokens,
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let code = env
            .error
            .code
            .map(|v| match v {
                serde_json::Value::String(s) => format!(" [code={s}]"),
                other => format!(" [code={other}]"),
            })
            .unwrap_or_default();
        format!("HTTP {status}{code}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%status, %message, "LLM request returned HTTP error");
    Err(ProviderError::Request(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::test_server;
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode, header},
        routing::post,
    };
    use serde_json::{Value, json};
    use std::time::{Duration, Instant};

    async fn fake_completions(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some("Bearer key") {
            let err = json!({"error": {"message": "Incorrect API key provided", "code": "invalid_api_key"}});
            return (StatusCode::UNAUTHORIZED, Json(err));
        }
        let reply = format!(
            "// {} messages, max_tokens={}\nWorld.clearAll();\n",
            body["messages"].as_array().map(Vec::len).unwrap_or(0),
            body["max_tokens"]
        );
        (StatusCode::OK, Json(json!({"choices": [{"message": {"role": "assistant", "content": reply}}]})))
    }

    async fn provider_at(router: Router, key: &str, timeout_seconds: u64) -> OpenAiCompatibleProvider {
        let base = test_server::spawn(router).await;
        OpenAiCompatibleProvider::new(
            format!("{base}/v1/chat/completions"),
            "test-model".to_string(),
            timeout_seconds,
            key.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn constructs_provider() {
        let provider = OpenAiCompatibleProvider::new(
            "http://127.0.0.1:8081/v1/chat/completions".to_string(),
            "qwen2.5-instruct".to_string(),
            5,
            "key".to_string(),
        );
        assert!(provider.is_ok());
    }

    #[test]
    fn body_maps_roles_and_limits() {
        let history = [
            ChatTurn::user("rules"),
            ChatTurn { role: Role::Model, text: "ok".into() },
        ];
        let config = GenerationConfig { max_output_tokens: 512, ..GenerationConfig::default() };
        let json = serde_json::to_value(request_body("m", &history, "go", &config)).unwrap();

        let roles: Vec<&str> = json["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, ["user", "assistant", "user"]);
        assert_eq!(json["messages"][2]["content"], "go");
        assert_eq!(json["max_tokens"], 512);
        assert!(json.get("top_k").is_none());
    }

    #[tokio::test]
    async fn decodes_successful_reply_untrimmed() {
        let router = Router::new().route("/v1/chat/completions", post(fake_completions));
        let p = provider_at(router, "key", 5).await;
        let out = p
            .generate(&[ChatTurn::user("rules")], "drop a ball", &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(out, "// 2 messages, max_tokens=4096\nWorld.clearAll();\n");
    }

    #[tokio::test]
    async fn rejected_key_surfaces_error_code() {
        let router = Router::new().route("/v1/chat/completions", post(fake_completions));
        let p = provider_at(router, "wrong", 5).await;
        let msg = p.generate(&[], "hi", &GenerationConfig::default()).await.unwrap_err().to_string();
        assert!(msg.contains("HTTP 401"), "{msg}");
        assert!(msg.contains("[code=invalid_api_key]: Incorrect API key provided"), "{msg}");
    }

    #[tokio::test]
    async fn rate_limit_is_request_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                let err = json!({"error": {"message": "Rate limit reached", "code": 429}});
                (StatusCode::TOO_MANY_REQUESTS, Json(err))
            }),
        );
        let p = provider_at(router, "key", 5).await;
        let err = p.generate(&[], "hi", &GenerationConfig::default()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(ref m) if m.contains("HTTP 429") && m.contains("[code=429]")));
    }

    #[tokio::test]
    async fn slow_upstream_hits_timeout() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"choices": []}))
            }),
        );
        let p = provider_at(router, "key", 1).await;

        let started = Instant::now();
        let err = p.generate(&[], "hi", &GenerationConfig::default()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
