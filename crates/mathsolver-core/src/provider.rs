//! Language Model Providers
//!
//! The decision loop, the calculator and the reasoning tool all reach the
//! model through `LlmProvider`, so any chat-completions backend can sit
//! behind them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mathsolver_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = GroqProvider::new(api_key, GroqConfig::from_env())?;
//! let completion = provider.complete(&messages, &GenerationOptions::default()).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "gemma2-9b-it";

/// Per-call sampling settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Generation halts before any of these
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

const fn default_temperature() -> f32 {
    0.7
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            temperature: default_temperature(),
            max_tokens: None,
            stop_sequences: Vec::new(),
        }
    }
}

impl GenerationOptions {
    /// Same options with a different stop list
    #[must_use]
    pub fn with_stop(mut self, stop: &[&str]) -> Self {
        self.stop_sequences = stop.iter().map(|s| (*s).to_string()).collect();
        self
    }
}

/// One model reply
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,

    /// Model name echoed by the backend
    pub model: String,

    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<FinishReason>,
}

/// Token accounting reported by the backend
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Why generation ended
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Other,
}

impl FinishReason {
    /// Map an OpenAI-style `finish_reason` string
    pub fn parse(reason: &str) -> Self {
        match reason {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "content_filter" => Self::ContentFilter,
            _ => Self::Other,
        }
    }
}

/// A chat-completions backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Used in log lines
    fn name(&self) -> &str;

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;

    /// Single-prompt convenience: one user message, text back
    async fn complete_prompt(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let completion = self.complete(&[Message::user(prompt)], options).await?;
        Ok(completion.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(opts.model, "gemma2-9b-it");
        assert!(opts.stop_sequences.is_empty());
    }

    #[test]
    fn test_with_stop() {
        let opts = GenerationOptions::default().with_stop(&["\nObservation:"]);
        assert_eq!(opts.stop_sequences, vec!["\nObservation:".to_string()]);
    }

    #[test]
    fn test_finish_reason_parse() {
        assert_eq!(FinishReason::parse("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::parse("length"), FinishReason::Length);
        assert_eq!(FinishReason::parse("tool_calls"), FinishReason::Other);
    }
}
