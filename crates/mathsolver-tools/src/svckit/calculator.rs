//! Calculator Tool
//!
//! Asks the model to translate the input into a single expression inside a
//! ```` ```text ```` block, then evaluates that expression locally.

use std::sync::Arc;

use async_trait::async_trait;
use mathsolver_core::{GenerationOptions, LlmProvider, Tool, ToolError, ToolKind, ToolSchema};

use crate::expression;
use crate::prompts::{self, CALCULATOR_DESCRIPTION, CALCULATOR_NAME, MATH_PROMPT};

const TEXT_FENCE: &str = "```text";
const FENCE: &str = "```";
const ANSWER: &str = "Answer:";

/// LLM-assisted arithmetic evaluator
pub struct CalculatorTool {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl CalculatorTool {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self {
            provider,
            options: options.with_stop(&["```output"]),
        }
    }

    /// Turn the model's reply into `Answer: …`
    fn process_reply(reply: &str) -> Result<String, ToolError> {
        let reply = reply.trim();

        if let Some(expr) = reply
            .strip_prefix(TEXT_FENCE)
            .and_then(|rest| rest.find(FENCE).map(|end| rest[..end].trim()))
        {
            let value = expression::evaluate(expr).map_err(|e| {
                ToolError::Evaluation(format!(
                    "evaluate(\"{expr}\") raised error: {e}. Please try again with a valid numerical expression"
                ))
            })?;
            tracing::debug!(expression = %expr, value, "Evaluated expression");
            return Ok(format!("{ANSWER} {}", expression::format_number(value)));
        }

        if reply.starts_with(ANSWER) {
            return Ok(reply.to_string());
        }

        if let Some((_, answer)) = reply.rsplit_once(ANSWER) {
            return Ok(format!("{ANSWER} {}", answer.trim()));
        }

        Err(ToolError::Evaluation(format!("unknown format from LLM: {reply}")))
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: CALCULATOR_NAME.into(),
            description: CALCULATOR_DESCRIPTION.into(),
            kind: ToolKind::ArithmeticEvaluator,
        }
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let prompt = prompts::render(MATH_PROMPT, input);
        let reply = self
            .provider
            .complete_prompt(&prompt, &self.options)
            .await
            .map_err(|e| ToolError::Provider(e.to_string()))?;

        Self::process_reply(&reply)
    }
}
