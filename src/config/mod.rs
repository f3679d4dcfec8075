//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the file given with `-f`), then applies `SIMPHY_BIND`,
//! `SIMPHY_LOG_LEVEL` and `SIMPHY_KNOWLEDGE_BASE` overrides. The provider
//! credential only ever comes from the environment.
//!
//! # Module layout
//!
//! - **types** — resolved structs consumed by the relay (`Config`, `LlmConfig`, …).
//! - **raw** — TOML deserialization shapes with serde defaults; private.
//! - **load** — `load`, `load_from`, `expand_home`, `EnvOverrides`.

mod load;
mod raw;
mod types;

pub use load::{EnvOverrides, expand_home, load, load_from};
pub use types::*;

impl Config {
    /// Safe `Config` for tests — dummy LLM, no API key, no external calls.
    pub fn test_default(knowledge_base_path: &std::path::Path) -> Self {
        Self {
            bind: "127.0.0.1:0".into(),
            log_level: "info".into(),
            knowledge_base_path: knowledge_base_path.to_path_buf(),
            llm: LlmConfig {
                provider: "dummy".into(),
                generation: GenerationConfig::default(),
                gemini: GeminiConfig {
                    api_base_url: "http://localhost:0/v1beta".into(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                },
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                },
                dummy: DummyConfig::default(),
            },
            llm_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::NamedTempFile;

    const FULL_TOML: &str = r#"
[server]
bind = "0.0.0.0:4000"
log_level = "debug"

[knowledge_base]
path = "/srv/simphy/kb.json"

[llm]
default = "openai"

[llm.generation]
temperature = 0.1
top_k = 3
top_p = 0.9
max_output_tokens = 1024

[llm.openai]
api_base_url = "http://127.0.0.1:8081/v1/chat/completions"
model = "qwen2.5-instruct"
timeout_seconds = 30
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_full_config() {
        let f = write_toml(FULL_TOML);
        let cfg = load_from(f.path(), &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:4000");
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.knowledge_base_path, PathBuf::from("/srv/simphy/kb.json"));
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.generation.top_k, 3);
        assert_eq!(cfg.llm.generation.max_output_tokens, 1024);
        assert_eq!(cfg.llm.openai.model, "qwen2.5-instruct");
        assert_eq!(cfg.llm.active_model(), "qwen2.5-instruct");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let f = write_toml("");
        let cfg = load_from(f.path(), &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.knowledge_base_path, PathBuf::from("knowledge_base.json"));
        assert_eq!(cfg.llm.provider, "gemini");
        assert_eq!(cfg.llm.gemini.model, "gemini-1.5-flash-latest");
        assert_eq!(cfg.llm.generation.temperature, 0.4);
        assert_eq!(cfg.llm.generation.top_k, 1);
        assert_eq!(cfg.llm.generation.top_p, 1.0);
        assert_eq!(cfg.llm.generation.max_output_tokens, 4096);
        assert!(cfg.llm_api_key.is_none());
    }

    #[test]
    fn dummy_section_parses() {
        let f = write_toml("[llm]\ndefault = \"dummy\"\n\n[llm.dummy]\nreply = \"World.clearAll();\"\n");
        let cfg = load_from(f.path(), &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.llm.dummy.reply.as_deref(), Some("World.clearAll();"));
        assert!(!cfg.llm.dummy.fail);
        assert_eq!(cfg.llm.active_model(), "dummy");
    }

    #[test]
    fn overrides_win_over_file() {
        let f = write_toml(FULL_TOML);
        let overrides = EnvOverrides {
            bind: Some("127.0.0.1:9999".into()),
            log_level: Some("warn".into()),
            knowledge_base: Some("other.json".into()),
            api_key: Some("secret".into()),
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:9999");
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.knowledge_base_path, PathBuf::from("other.json"));
        assert_eq!(cfg.llm_api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), &EnvOverrides::default());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
        assert!(msg.contains("cannot read"));
    }

    #[test]
    fn malformed_file_errors() {
        let f = write_toml("[server\nbind = ");
        let msg = load_from(f.path(), &EnvOverrides::default()).unwrap_err().to_string();
        assert!(msg.contains("parse error"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/simphy/kb.json");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with("simphy/kb.json"));
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_home("knowledge_base.json"), PathBuf::from("knowledge_base.json"));
    }
}
