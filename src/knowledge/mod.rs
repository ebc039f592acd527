//! FAQ knowledge store
//!
//! Components:
//! - Embedding Engine: local sentence embeddings via Candle
//! - Vector DB Manager: Qdrant collection holding the FAQ records
//!
//! The rest of the crate only sees the `Encoder` and `VectorIndex` traits, so
//! either backend can be swapped (tests use in-memory fakes).

pub mod embedding;
pub mod vector_db;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

pub use embedding::EmbeddingEngine;
pub use vector_db::VectorDBManager;

/// One stored FAQ entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub embedding: Vec<f32>,
}

impl FaqRecord {
    /// Text that is embedded and stored as the point's document
    pub fn document(&self) -> String {
        document_text(&self.question, &self.answer)
    }
}

pub fn document_text(question: &str, answer: &str) -> String {
    format!("{}\n{}", question, answer)
}

/// Query result from vector search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub id: String,
    pub score: f32,
    pub document: String,
    pub metadata: HashMap<String, JsonValue>,
}

/// Text → fixed-dimension vector
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;

    async fn encode_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in &texts {
            out.push(self.encode(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize;

    fn model_id(&self) -> &str;
}

/// Nearest-neighbour search over stored FAQ records
///
/// `query` always returns documents and metadata; results are ordered by
/// descending similarity and never exceed `top_k`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<QueryResult>>;

    async fn upsert(&self, records: Vec<FaqRecord>) -> Result<()>;

    async fn count(&self) -> Result<u64>;

    fn collection(&self) -> &str;
}
