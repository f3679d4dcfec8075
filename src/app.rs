//! Startup wiring: everything that can fail fatally happens in
//! [`App::prepare`], before any listener is bound.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::http::{self, AppState};
use crate::knowledge::KnowledgeBase;
use crate::llm::providers;
use crate::relay::Relay;

pub struct App {
    bind: String,
    state: AppState,
}

impl App {
    /// Load the knowledge base, check the credential and build the provider.
    pub fn prepare(config: &Config) -> Result<Self, AppError> {
        let knowledge = KnowledgeBase::load(&config.knowledge_base_path)?;
        let provider = providers::build(&config.llm, config.llm_api_key.clone())?;

        info!(
            provider = provider.name(),
            model = config.llm.active_model(),
            temperature = config.llm.generation.temperature,
            top_k = config.llm.generation.top_k,
            max_output_tokens = config.llm.generation.max_output_tokens,
            "provider ready"
        );

        let relay = Relay::new(Arc::new(knowledge), provider, config.llm.generation);
        Ok(Self { bind: config.bind.clone(), state: AppState::new(relay) })
    }

    pub fn router(&self) -> axum::Router {
        http::build_router(self.state.clone())
    }

    /// Bind and serve until `shutdown` is cancelled.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), AppError> {
        let router = self.router();
        http::serve(&self.bind, router, shutdown).await
    }
}
