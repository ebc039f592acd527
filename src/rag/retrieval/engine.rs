// FAQ lookup tool: semantic search over the FAQ collection
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::errors::ToolError;
use crate::knowledge::{Encoder, VectorIndex};
use crate::rag::context::RetrievedContext;

/// Neighbours requested per lookup, whatever the corpus size
pub const FAQ_TOP_K: usize = 3;

pub const TOOL_NAME: &str = "faq_lookup_tool";

pub const TOOL_DESCRIPTION: &str = "Searches the company's frequently asked questions for relevant answers \
using semantic search. Use this tool when the user asks a question about company policies, products, or \
general FAQs. Input should be a question string.";

/// Query → formatted FAQ context
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<String, ToolError>;

    fn name(&self) -> &str;

    fn description(&self) -> &str;
}

/// Retriever backed by the embedding encoder and the vector index
pub struct FaqTool {
    encoder: Arc<dyn Encoder>,
    index: Arc<dyn VectorIndex>,
}

impl FaqTool {
    pub fn new(encoder: Arc<dyn Encoder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { encoder, index }
    }

    /// Embed the query and fetch the top `FAQ_TOP_K` entries
    pub async fn retrieve(&self, query: &str) -> Result<RetrievedContext, ToolError> {
        let embedding = self
            .encoder
            .encode(query)
            .await
            .map_err(|e| ToolError::EncodingFailed(format!("{:#}", e)))?;

        let results = self
            .index
            .query(&embedding, FAQ_TOP_K)
            .await
            .map_err(|e| ToolError::SearchFailed(format!("{:#}", e)))?;

        debug!(
            collection = self.index.collection(),
            hits = results.len(),
            "FAQ lookup complete"
        );

        Ok(RetrievedContext::from_results(&results))
    }
}

#[async_trait]
impl Retriever for FaqTool {
    async fn lookup(&self, query: &str) -> Result<String, ToolError> {
        Ok(self.retrieve(query).await?.render())
    }

    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        TOOL_DESCRIPTION
    }
}
