//! Dummy LLM provider — keyless stand-in for a real backend.
//!
//! Echoes the live turn back prefixed with `[echo]`, returns a fixed reply,
//! or fails every call. Clones share a call counter and the last message
//! seen, so a test can hand one clone to the relay and inspect the other.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::DummyConfig;
use crate::llm::{ChatTurn, GenerationConfig, ProviderError};

#[derive(Debug, Clone)]
enum Reply {
    Echo,
    Fixed(String),
    Fail(String),
}

#[derive(Debug, Clone)]
pub struct DummyProvider {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    last_message: Arc<Mutex<Option<String>>>,
}

impl DummyProvider {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            last_message: Arc::new(Mutex::new(None)),
        }
    }

    pub fn echo() -> Self {
        Self::with_reply(Reply::Echo)
    }

    pub fn fixed(text: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fixed(text.into()))
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(reason.into()))
    }

    pub fn from_config(config: &DummyConfig) -> Self {
        if config.fail {
            Self::failing("dummy provider configured to fail")
        } else if let Some(text) = &config.reply {
            Self::fixed(text.clone())
        } else {
            Self::echo()
        }
    }

    /// Number of `generate` calls made through any clone.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Live-turn text of the most recent call.
    pub fn last_message(&self) -> Option<String> {
        self.last_message.lock().ok().and_then(|m| m.clone())
    }

    pub async fn generate(
        &self,
        history: &[ChatTurn],
        message: &str,
        _config: &GenerationConfig,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_message.lock() {
            *last = Some(message.to_string());
        }
        debug!(history_turns = history.len(), message_len = message.len(), "dummy provider called");

        match &self.reply {
            Reply::Echo => Ok(format!("[echo] {message}")),
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Fail(reason) => Err(ProviderError::Request(reason.clone())),
        }
    }
}
