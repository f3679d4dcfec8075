//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults, so a
//! file only needs the keys it wants to change. The `load` module converts
//! them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub server: RawServer,
    #[serde(default)]
    pub knowledge_base: RawKnowledgeBase,
    #[serde(default)]
    pub llm: RawLlm,
}

#[derive(Deserialize)]
pub(super) struct RawServer {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawKnowledgeBase {
    #[serde(default = "default_knowledge_base_path")]
    pub path: String,
}

impl Default for RawKnowledgeBase {
    fn default() -> Self {
        Self { path: default_knowledge_base_path() }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub generation: RawGeneration,
    #[serde(default)]
    pub gemini: RawGemini,
    #[serde(default)]
    pub openai: RawOpenAi,
    #[serde(default)]
    pub dummy: RawDummy,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            generation: RawGeneration::default(),
            gemini: RawGemini::default(),
            openai: RawOpenAi::default(),
            dummy: RawDummy::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawGeneration {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for RawGeneration {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawGemini {
    #[serde(default = "default_gemini_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawGemini {
    fn default() -> Self {
        Self {
            api_base_url: default_gemini_api_base_url(),
            model: default_gemini_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAi {
    #[serde(default = "default_openai_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawOpenAi {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize, Default)]
pub(super) struct RawDummy {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub fail: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_bind() -> String { "127.0.0.1:3000".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_knowledge_base_path() -> String { "knowledge_base.json".to_string() }
fn default_llm_provider() -> String { "gemini".to_string() }
fn default_temperature() -> f32 { 0.4 }
fn default_top_k() -> u32 { 1 }
fn default_top_p() -> f32 { 1.0 }
fn default_max_output_tokens() -> u32 { 4096 }
fn default_gemini_api_base_url() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_gemini_model() -> String { "gemini-1.5-flash-latest".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_timeout_seconds() -> u64 { 120 }
