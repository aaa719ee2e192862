//! Reasoning Tool
//!
//! Wraps the question in a fixed step-by-step template and returns the
//! model's raw reply.

use std::sync::Arc;

use async_trait::async_trait;
use mathsolver_core::{GenerationOptions, LlmProvider, Tool, ToolError, ToolKind, ToolSchema};

use crate::prompts::{self, REASONING_DESCRIPTION, REASONING_NAME, REASONING_TEMPLATE};

/// Free-form reasoning over a language model
pub struct ReasoningTool {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl ReasoningTool {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self { provider, options }
    }
}

#[async_trait]
impl Tool for ReasoningTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: REASONING_NAME.into(),
            description: REASONING_DESCRIPTION.into(),
            kind: ToolKind::Reasoning,
        }
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let prompt = prompts::render(REASONING_TEMPLATE, input);
        self.provider
            .complete_prompt(&prompt, &self.options)
            .await
            .map_err(|e| ToolError::Provider(e.to_string()))
    }
}
