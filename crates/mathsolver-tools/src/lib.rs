//! # mathsolver-tools
//!
//! The three tools behind the math problem solver.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  Wikipedia       free-text lookup against the encyclopedia │
//! │  Calculator      model writes an expression, we evaluate   │
//! │  Reasoning tool  model explains the solution pointwise     │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod encyclopedia;
pub mod error;
pub mod expression;
pub mod prompts;
pub mod svckit;

use std::sync::Arc;

use async_trait::async_trait;
use mathsolver_core::{
    GenerationOptions, LlmProvider, Result as CoreResult, Tool, ToolError, ToolRegistry,
    ToolSchema,
};

pub use error::ExpressionError;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{CalculatorTool, EncyclopediaTool, ReasoningTool};
}

use encyclopedia::EncyclopediaClient;
use svckit::{CalculatorTool, EncyclopediaTool, ReasoningTool};

/// The closed set of tools the solver ships with
pub enum SolverTool {
    Encyclopedia(EncyclopediaTool),
    Calculator(CalculatorTool),
    Reasoning(ReasoningTool),
}

#[async_trait]
impl Tool for SolverTool {
    fn schema(&self) -> ToolSchema {
        match self {
            Self::Encyclopedia(tool) => tool.schema(),
            Self::Calculator(tool) => tool.schema(),
            Self::Reasoning(tool) => tool.schema(),
        }
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        match self {
            Self::Encyclopedia(tool) => tool.invoke(input).await,
            Self::Calculator(tool) => tool.invoke(input).await,
            Self::Reasoning(tool) => tool.invoke(input).await,
        }
    }
}

impl SolverTool {
    /// All three tools, in the order they are offered to the model
    pub fn all(
        provider: &Arc<dyn LlmProvider>,
        encyclopedia: Arc<dyn EncyclopediaClient>,
        options: &GenerationOptions,
    ) -> [Self; 3] {
        [
            Self::Encyclopedia(EncyclopediaTool::new(encyclopedia)),
            Self::Calculator(CalculatorTool::new(Arc::clone(provider), options.clone())),
            Self::Reasoning(ReasoningTool::new(Arc::clone(provider), options.clone())),
        ]
    }
}

/// Build the registry for one session's provider
pub fn default_registry(
    provider: &Arc<dyn LlmProvider>,
    encyclopedia: Arc<dyn EncyclopediaClient>,
    options: &GenerationOptions,
) -> CoreResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in SolverTool::all(provider, encyclopedia, options) {
        registry.register(tool)?;
    }
    Ok(registry)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use mathsolver_core::provider::Completion;
    use mathsolver_core::{AgentError, GenerationOptions, LlmProvider, Message, Result};

    /// Replays canned replies and records prompts
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        pub fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| (*r).to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            self.prompts
                .lock()
                .unwrap()
                .extend(messages.iter().map(|m| m.content.clone()));
            let content = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AgentError::Provider("script exhausted".into()))?;
            Ok(Completion {
                content,
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use mathsolver_core::{AgentBuilder, EventSink, ToolKind, Transcript};

    struct Shelf;

    #[async_trait]
    impl EncyclopediaClient for Shelf {
        async fn lookup(&self, query: &str) -> Result<String, ToolError> {
            Ok(format!("Page: {query}\nSummary: about {query}"))
        }

        fn name(&self) -> &str {
            "shelf"
        }
    }

    #[test]
    fn test_default_registry() {
        let provider: Arc<dyn LlmProvider> = Arc::new(ScriptedProvider::new(&[]));
        let registry =
            default_registry(&provider, Arc::new(Shelf), &GenerationOptions::default()).unwrap();

        assert_eq!(registry.names(), vec!["Wikipedia", "Calculator", "Reasoning tool"]);
        let kinds: Vec<ToolKind> = registry.schemas().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![ToolKind::EncyclopediaLookup, ToolKind::ArithmeticEvaluator, ToolKind::Reasoning]
        );
    }

    #[tokio::test]
    async fn test_end_to_end_calculator_path() {
        let provider: Arc<dyn LlmProvider> = Arc::new(ScriptedProvider::new(&[
            " I should use the calculator.\nAction: Calculator\nAction Input: 2 + 2",
            "```text\n2 + 2\n```",
            " I now know the final answer\nFinal Answer: 2 + 2 = 4",
        ]));
        let registry =
            default_registry(&provider, Arc::new(Shelf), &GenerationOptions::default()).unwrap();
        let agent = AgentBuilder::new()
            .provider(provider)
            .tools(Arc::new(registry))
            .build()
            .unwrap();

        let mut transcript = Transcript::new();
        transcript.push_user("What is 2 + 2?");
        let run = agent.run(&transcript, &EventSink::none()).await.unwrap();

        assert!(run.answer.contains('4'));
        assert_eq!(run.steps[0].observation, "Answer: 4");
    }

    #[tokio::test]
    async fn test_end_to_end_lookup_path() {
        let provider: Arc<dyn LlmProvider> = Arc::new(ScriptedProvider::new(&[
            "Action: Wikipedia\nAction Input: Marie Curie",
            "Final Answer: A physicist and chemist.",
        ]));
        let registry =
            default_registry(&provider, Arc::new(Shelf), &GenerationOptions::default()).unwrap();
        let agent = AgentBuilder::new()
            .provider(provider)
            .tools(Arc::new(registry))
            .build()
            .unwrap();

        let mut transcript = Transcript::new();
        transcript.push_user("Who was Marie Curie?");
        let run = agent.run(&transcript, &EventSink::none()).await.unwrap();

        assert_eq!(run.steps[0].tool, "Wikipedia");
        assert!(run.steps[0].observation.contains("Marie Curie"));
    }
}
