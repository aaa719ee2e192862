//! # mathsolver-runtime
//!
//! Runtime providers for the math problem solver.
//!
//! ## Providers
//!
//! - **Groq** (default): hosted inference over the OpenAI-compatible
//!   chat completions API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mathsolver_runtime::groq::{GroqConfig, GroqProvider};
//!
//! let provider = GroqProvider::new(api_key, GroqConfig::from_env())?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "groq")]
pub mod groq;

#[cfg(feature = "groq")]
pub use groq::{GroqConfig, GroqProvider};

// Re-export core types for convenience
pub use mathsolver_core::{AgentError, LlmProvider, Message, Result, Role};
