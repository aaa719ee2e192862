//! Agent Events
//!
//! Progress reported by the decision loop while a turn is running. The
//! server forwards these over WebSocket so the page can show the agent's
//! thoughts as they happen.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// One action taken by the decision loop
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStep {
    /// Tool that was selected (`_Exception` for a recovered parse error)
    pub tool: String,

    /// Input handed to the tool
    pub tool_input: String,

    /// Raw model output that produced this step
    pub log: String,

    /// What came back
    pub observation: String,
}

/// Result of a completed agent turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRun {
    pub answer: String,
    pub steps: Vec<AgentStep>,
}

/// Callback event emitted during a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentEvent {
    Thought { text: String },
    ToolStart { tool: String, input: String },
    ToolEnd { tool: String, output: String },
    ParseError { observation: String },
    Finish { answer: String },
}

/// Where events go; a sink without a channel drops them
#[derive(Clone, Debug, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<AgentEvent>>,
}

impl EventSink {
    /// Sink that discards everything
    pub const fn none() -> Self {
        Self { tx: None }
    }

    /// Sink feeding an unbounded channel
    pub const fn channel(tx: UnboundedSender<AgentEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Emit an event. A closed receiver is not an error.
    pub fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::trace!("Event receiver dropped");
            }
        }
    }
}
