//! Application State

use std::sync::Arc;

use mathsolver_core::{
    Agent, AgentBuilder, GenerationOptions, LlmProvider, Result, SessionStore,
};
use mathsolver_runtime::{GroqConfig, GroqProvider};
use mathsolver_tools::{default_registry, encyclopedia::EncyclopediaClient};

/// Builds a provider bound to the caller's API key
pub trait ProviderFactory: Send + Sync {
    fn create(&self, api_key: &str) -> Result<Arc<dyn LlmProvider>>;
}

/// Groq-backed factory
pub struct GroqFactory {
    config: GroqConfig,
}

impl GroqFactory {
    pub const fn new(config: GroqConfig) -> Self {
        Self { config }
    }
}

impl ProviderFactory for GroqFactory {
    fn create(&self, api_key: &str) -> Result<Arc<dyn LlmProvider>> {
        Ok(Arc::new(GroqProvider::new(api_key, self.config.clone())?))
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Live chat sessions
    pub sessions: Arc<SessionStore>,

    /// Provider construction, per API key
    pub providers: Arc<dyn ProviderFactory>,

    /// Encyclopedia behind the lookup tool
    pub encyclopedia: Arc<dyn EncyclopediaClient>,

    /// Model and sampling options
    pub generation: GenerationOptions,

    /// Decision loop step ceiling
    pub max_iterations: usize,
}

impl AppState {
    /// Assemble provider, tools and dispatcher for one turn
    pub fn build_agent(&self, api_key: &str) -> Result<Agent> {
        let provider = self.providers.create(api_key)?;
        let tools = default_registry(&provider, Arc::clone(&self.encyclopedia), &self.generation)?;

        AgentBuilder::new()
            .provider(provider)
            .tools(Arc::new(tools))
            .model(self.generation.model.clone())
            .temperature(self.generation.temperature)
            .max_iterations(self.max_iterations)
            .build()
    }
}
