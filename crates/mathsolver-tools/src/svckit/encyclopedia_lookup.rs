//! Encyclopedia Lookup Tool
//!
//! Forwards the query verbatim to the configured encyclopedia.

use std::sync::Arc;

use async_trait::async_trait;
use mathsolver_core::{Tool, ToolError, ToolKind, ToolSchema};

use crate::encyclopedia::EncyclopediaClient;
use crate::prompts::{WIKIPEDIA_DESCRIPTION, WIKIPEDIA_NAME};

/// Tool for looking topics up in an encyclopedia
pub struct EncyclopediaTool {
    client: Arc<dyn EncyclopediaClient>,
}

impl EncyclopediaTool {
    pub fn new(client: Arc<dyn EncyclopediaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for EncyclopediaTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: WIKIPEDIA_NAME.into(),
            description: WIKIPEDIA_DESCRIPTION.into(),
            kind: ToolKind::EncyclopediaLookup,
        }
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        tracing::debug!(service = self.client.name(), query = %input, "Encyclopedia lookup");
        self.client.lookup(input).await
    }
}
