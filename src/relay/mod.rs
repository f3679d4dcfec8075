//! Generation relay — validates a prompt, augments it with the knowledge base,
//! and makes exactly one provider call.
//!
//! The knowledge base and provider are injected at construction; nothing is
//! mutated while serving, so one `Relay` is shared by all requests.

pub mod prompt;

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::knowledge::KnowledgeBase;
use crate::llm::{ChatTurn, GenerationConfig, LlmProvider};

/// Caller-visible failure of a generation request. Provider detail is logged,
/// never carried here.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    #[error("Prompt is required")]
    BadRequest,
    #[error("Failed to generate script")]
    GenerationFailed,
}

#[derive(Debug)]
pub struct Relay {
    knowledge: Arc<KnowledgeBase>,
    provider: LlmProvider,
    generation: GenerationConfig,
    history: Vec<ChatTurn>,
}

impl Relay {
    pub fn new(knowledge: Arc<KnowledgeBase>, provider: LlmProvider, generation: GenerationConfig) -> Self {
        Self {
            knowledge,
            provider,
            generation,
            history: vec![ChatTurn::user(prompt::SYSTEM_INSTRUCTION)],
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// The live turn sent to the model for `user_prompt`.
    pub fn augmented_prompt(&self, user_prompt: &str) -> String {
        prompt::augmented(self.knowledge.rendered(), user_prompt)
    }

    /// Generate a script for `user_prompt`.
    ///
    /// An absent or empty prompt is rejected without calling the provider.
    /// On success the model's text is returned unmodified.
    pub async fn generate(&self, user_prompt: Option<&str>) -> Result<String, RelayError> {
        let user_prompt = match user_prompt {
            Some(p) if !p.is_empty() => p,
            _ => return Err(RelayError::BadRequest),
        };

        info!(prompt = %user_prompt, "received prompt");

        let message = self.augmented_prompt(user_prompt);
        match self.provider.generate(&self.history, &message, &self.generation).await {
            Ok(script) => {
                info!(provider = self.provider.name(), script_len = script.len(), "script generated");
                Ok(script)
            }
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "model call failed");
                Err(RelayError::GenerationFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;
    use serde_json::json;

    fn relay_with(dummy: &DummyProvider) -> Relay {
        let kb = KnowledgeBase::from_value(json!({"Body": "create rigid body"}));
        Relay::new(Arc::new(kb), LlmProvider::Dummy(dummy.clone()), GenerationConfig::default())
    }

    #[tokio::test]
    async fn returns_model_text_unmodified() {
        let dummy = DummyProvider::fixed("World.clearAll();\n");
        let relay = relay_with(&dummy);
        let script = relay.generate(Some("drop a ball")).await.unwrap();
        assert_eq!(script, "World.clearAll();\n");
        assert_eq!(dummy.calls(), 1);
    }

    #[tokio::test]
    async fn missing_or_empty_prompt_skips_provider() {
        let dummy = DummyProvider::echo();
        let relay = relay_with(&dummy);
        assert_eq!(relay.generate(None).await, Err(RelayError::BadRequest));
        assert_eq!(relay.generate(Some("")).await, Err(RelayError::BadRequest));
        assert_eq!(dummy.calls(), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_generic() {
        let dummy = DummyProvider::failing("429 quota exceeded for project 1234");
        let relay = relay_with(&dummy);
        let err = relay.generate(Some("drop a ball")).await.unwrap_err();
        assert_eq!(err, RelayError::GenerationFailed);
        assert_eq!(err.to_string(), "Failed to generate script");
        assert_eq!(dummy.calls(), 1);
    }

    #[tokio::test]
    async fn live_turn_carries_knowledge_and_prompt() {
        let dummy = DummyProvider::echo();
        let relay = relay_with(&dummy);
        relay.generate(Some("drop a ball")).await.unwrap();

        let sent = dummy.last_message().unwrap();
        assert!(sent.contains(relay.knowledge().rendered()));
        assert!(sent.contains("drop a ball"));
    }

    #[test]
    fn system_instruction_is_prior_history() {
        let relay = relay_with(&DummyProvider::echo());
        assert_eq!(relay.history, vec![ChatTurn::user(prompt::SYSTEM_INSTRUCTION)]);
    }
}
