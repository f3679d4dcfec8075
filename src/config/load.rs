//! Configuration loading with env-var overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

use super::raw::RawConfig;
use super::types::*;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Values taken from the process environment, applied on top of the file.
///
/// Kept separate from the loader so tests pass overrides directly instead of
/// mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub bind: Option<String>,
    pub log_level: Option<String>,
    pub knowledge_base: Option<String>,
    pub api_key: Option<String>,
}

impl EnvOverrides {
    /// Read `SIMPHY_BIND`, `SIMPHY_LOG_LEVEL`, `SIMPHY_KNOWLEDGE_BASE` and the
    /// provider key (`GEMINI_API_KEY`, falling back to `LLM_API_KEY`).
    pub fn from_env() -> Self {
        Self {
            bind: non_empty_var("SIMPHY_BIND"),
            log_level: non_empty_var("SIMPHY_LOG_LEVEL"),
            knowledge_base: non_empty_var("SIMPHY_KNOWLEDGE_BASE"),
            api_key: non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("LLM_API_KEY")),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. Without an explicit path and without the default file
/// the built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        Ok(resolve(RawConfig::default(), &overrides))
    }
}

/// Load a specific TOML file and apply `overrides`.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    Ok(resolve(parsed, overrides))
}

fn resolve(raw: RawConfig, overrides: &EnvOverrides) -> Config {
    let bind = overrides.bind.clone().unwrap_or(raw.server.bind);
    let log_level = overrides.log_level.clone().unwrap_or(raw.server.log_level);
    let kb_path = overrides
        .knowledge_base
        .clone()
        .unwrap_or(raw.knowledge_base.path);

    let llm = raw.llm;
    Config {
        bind,
        log_level,
        knowledge_base_path: expand_home(&kb_path),
        llm: LlmConfig {
            provider: llm.provider,
            generation: GenerationConfig {
                temperature: llm.generation.temperature,
                top_k: llm.generation.top_k,
                top_p: llm.generation.top_p,
                max_output_tokens: llm.generation.max_output_tokens,
            },
            gemini: GeminiConfig {
                api_base_url: llm.gemini.api_base_url,
                model: llm.gemini.model,
                timeout_seconds: llm.gemini.timeout_seconds,
            },
            openai: OpenAiConfig {
                api_base_url: llm.openai.api_base_url,
                model: llm.openai.model,
                timeout_seconds: llm.openai.timeout_seconds,
            },
            dummy: DummyConfig {
                reply: llm.dummy.reply,
                fail: llm.dummy.fail,
            },
        },
        llm_api_key: overrides.api_key.clone(),
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
