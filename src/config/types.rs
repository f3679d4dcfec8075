//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the relay consumes.
//! Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

pub use crate::llm::GenerationConfig;

// ── LLM ─────────────────────────────────────────────────────────────────────

/// Google Generative Language provider configuration (`[llm.gemini]`).
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root, without the `models/...` suffix.
    pub api_base_url: String,
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// OpenAI / OpenAI-compatible provider configuration (`[llm.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

/// Keyless test provider configuration (`[llm.dummy]`).
#[derive(Debug, Clone, Default)]
pub struct DummyConfig {
    /// Fixed reply; the provider echoes its input when unset.
    pub reply: Option<String>,
    /// Fail every call instead of replying.
    pub fail: bool,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Active provider (`"gemini"`, `"openai"`, `"dummy"`).
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    /// Sampling parameters sent with every request (`[llm.generation]`).
    pub generation: GenerationConfig,
    pub gemini: GeminiConfig,
    pub openai: OpenAiConfig,
    pub dummy: DummyConfig,
}

impl LlmConfig {
    /// Model name of the active provider, for logs and `/health`.
    pub fn active_model(&self) -> &str {
        match self.provider.as_str() {
            "gemini" => &self.gemini.model,
            "openai" | "openai-compatible" => &self.openai.model,
            _ => "dummy",
        }
    }
}

// ── Top-level ───────────────────────────────────────────────────────────────

/// Fully-resolved relay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the HTTP listener binds to.
    pub bind: String,
    pub log_level: String,
    /// Knowledge-base JSON file (already expanded, no `~`).
    pub knowledge_base_path: PathBuf,
    pub llm: LlmConfig,
    /// Provider credential from `GEMINI_API_KEY` or `LLM_API_KEY`.
    /// Never sourced from TOML.
    pub llm_api_key: Option<String>,
}
