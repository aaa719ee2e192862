//! # mathsolver-core
//!
//! Transcript, tool registry and agent dispatch for the math problem solver.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ChatSession::submit                                         │
//! │   Transcript ──► Agent ──► DecisionLoop ──► ToolRegistry     │
//! │                              │                               │
//! │                              └──► LlmProvider (Strategy)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `DecisionLoop` trait keeps tool selection out of the dispatcher;
//! `ReactLoop` is the default implementation.

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;
pub mod transcript;

pub use error::{AgentError, Result, ToolError};
pub use event::{AgentEvent, AgentRun, AgentStep, EventSink};
pub use message::{Message, Role};
pub use provider::{GenerationOptions, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, DecisionLoop, ReactLoop};
pub use session::{ChatSession, SessionHandle, SessionId, SessionStore, TurnOutcome};
pub use tool::{Tool, ToolKind, ToolRegistry, ToolSchema};
pub use transcript::{RenderedMessage, Transcript};
