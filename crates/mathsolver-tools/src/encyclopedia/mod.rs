//! Encyclopedia Integration
//!
//! Abstraction over the free-text lookup service behind the `Wikipedia` tool.

mod wikipedia;

pub use wikipedia::{WikipediaClient, WikipediaConfig};

use async_trait::async_trait;
use mathsolver_core::ToolError;

/// Encyclopedia client trait (Strategy pattern)
#[async_trait]
pub trait EncyclopediaClient: Send + Sync {
    /// Search for `query` and return readable text
    async fn lookup(&self, query: &str) -> Result<String, ToolError>;

    /// Service name
    fn name(&self) -> &str;
}
