//! Tool System
//!
//! Tools are text-in/text-out capabilities the decision loop can invoke.
//! The registry is built once at startup and never changes afterwards.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AgentError, Result, ToolError};

/// The three kinds of capability the solver offers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    EncyclopediaLookup,
    ArithmeticEvaluator,
    Reasoning,
}

/// Name and description shown to the language model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (read by the model to decide applicability)
    pub description: String,

    pub kind: ToolKind,
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's name and description
    fn schema(&self) -> ToolSchema;

    /// Run the tool on free-text input
    async fn invoke(&self, input: &str) -> std::result::Result<String, ToolError>;
}

/// Registry for available tools, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<(ToolSchema, Arc<dyn Tool>)>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_shared(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let schema = tool.schema();
        if self.get(&schema.name).is_some() {
            return Err(AgentError::DuplicateTool(schema.name));
        }
        self.tools.push((schema, tool));
        Ok(())
    }

    /// Get a tool by exact name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|(schema, _)| schema.name == name)
            .map(|(_, tool)| Arc::clone(tool))
    }

    /// Invoke a tool by name
    pub async fn invoke(&self, name: &str, input: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;

        tracing::debug!(tool = %name, "Invoking tool");
        Ok(tool.invoke(input).await?)
    }

    /// Get all tool schemas
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|(schema, _)| schema.clone()).collect()
    }

    /// Get tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|(schema, _)| schema.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// One `name: description` line per tool
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|(schema, _)| format!("{}: {}", schema.name, schema.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
