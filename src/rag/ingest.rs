// Corpus ingestion: FAQ JSON file → embedded records in the vector index
use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::knowledge::{document_text, FaqRecord};
use crate::rag::registry::ResourceRegistry;

/// One FAQ as written in an ingestion file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    /// Explicit id, or the question itself so re-ingesting updates in place
    pub fn record_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.question.trim().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub collection: String,
    pub ingested: usize,
    pub total_documents: u64,
}

/// Parse and validate a JSON array of FAQ entries
pub fn parse_entries(json: &str) -> Result<Vec<FaqEntry>> {
    let entries: Vec<FaqEntry> = serde_json::from_str(json).context("Failed to parse FAQ file")?;

    for (i, entry) in entries.iter().enumerate() {
        if entry.question.trim().is_empty() {
            bail!("FAQ entry {} has an empty question", i);
        }
        if entry.answer.trim().is_empty() {
            bail!("FAQ entry {} has an empty answer", i);
        }
    }

    Ok(entries)
}

pub fn load_entries(path: &Path) -> Result<Vec<FaqEntry>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read FAQ file {}", path.display()))?;
    parse_entries(&contents)
}

/// Embed every entry in one batch and upsert into the configured collection
pub async fn ingest(registry: &ResourceRegistry, entries: Vec<FaqEntry>) -> Result<IngestReport> {
    let resources = registry.resources().await?;

    let texts: Vec<String> = entries
        .iter()
        .map(|e| document_text(&e.question, &e.answer))
        .collect();
    let embeddings = resources
        .encoder
        .encode_batch(texts)
        .await
        .context("Failed to embed FAQ entries")?;
    ensure!(
        embeddings.len() == entries.len(),
        "Encoder returned {} embeddings for {} entries",
        embeddings.len(),
        entries.len()
    );

    let records: Vec<FaqRecord> = entries
        .into_iter()
        .zip(embeddings)
        .map(|(entry, embedding)| FaqRecord {
            id: entry.record_id(),
            question: entry.question,
            answer: entry.answer,
            embedding,
        })
        .collect();
    let ingested = records.len();

    resources
        .index
        .upsert(records)
        .await
        .context("Failed to store FAQ entries")?;

    let total_documents = resources.index.count().await?;
    info!(
        collection = resources.index.collection(),
        ingested, total_documents, "FAQ corpus ingested"
    );

    Ok(IngestReport {
        collection: resources.index.collection().to_string(),
        ingested,
        total_documents,
    })
}
