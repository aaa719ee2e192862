//! Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

/// Failure raised by a tool invocation.
///
/// These are handed back to the caller of the turn unchanged; nothing in the
/// decision loop retries or reclassifies them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The external service could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The external service answered but the lookup failed
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// Input was not interpretable as a mathematical expression
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// The language model behind the tool failed
    #[error("Language model error: {0}")]
    Provider(String),
}

/// Everything that can end a turn early
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Provider error: {0}")]
    Provider(String),

    /// Transport failure, timeout or a 5xx from the backend
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// A tool failed while running
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool with the same name is already registered
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Worth another attempt by the caller
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_)
                | Self::RateLimited(_)
                | Self::Tool(ToolError::ServiceUnavailable(_))
        )
    }

    /// Text safe to show on the page
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::Auth(_) => "Authentication failed. Please check your Groq API key.".into(),
            Self::RateLimited(_) => "You've made too many requests. Please wait a moment.".into(),
            Self::Tool(err) => format!("Tool error: {err}"),
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_passes_through() {
        let err: AgentError = ToolError::Lookup("no such page".into()).into();
        assert!(matches!(err, AgentError::Tool(ToolError::Lookup(_))));
        assert_eq!(err.to_string(), "Tool error: Lookup failed: no such page");
    }

    #[test]
    fn test_retryable() {
        assert!(AgentError::RateLimited("slow down".into()).is_retryable());
        assert!(AgentError::Tool(ToolError::ServiceUnavailable("down".into())).is_retryable());
        assert!(!AgentError::Auth("bad key".into()).is_retryable());
        assert!(!AgentError::Tool(ToolError::Evaluation("1 +".into())).is_retryable());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let msg = AgentError::DuplicateTool("Calculator".into()).user_message();
        assert_eq!(msg, "An unexpected error occurred.");
    }
}
