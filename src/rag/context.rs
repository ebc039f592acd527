// FAQ context assembly and prompt augmentation
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

use crate::knowledge::QueryResult;

/// Returned verbatim when the index has no neighbours for a query
pub const NO_RESULTS_SENTINEL: &str = "No relevant information found in the FAQs.";

/// Stand-in when a stored entry carries no `question` metadata
pub const MISSING_QUESTION: &str = "N/A";

/// One retrieved FAQ entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub question: String,
    pub answer: String,
    pub score: f32,
}

impl ContextEntry {
    /// Pull question/answer out of the hit's metadata.
    ///
    /// Missing `question` becomes `N/A`; missing `answer` falls back to the
    /// raw indexed document text.
    pub fn from_query_result(result: &QueryResult) -> Self {
        let question = metadata_text(result, "question").unwrap_or_else(|| MISSING_QUESTION.to_string());
        let answer = metadata_text(result, "answer").unwrap_or_else(|| result.document.clone());

        Self {
            question,
            answer,
            score: result.score,
        }
    }

    /// Two-line `Question: …` / `Answer: …` block
    pub fn render(&self) -> String {
        format!("Question: {}\nAnswer: {}", self.question, self.answer)
    }
}

fn metadata_text(result: &QueryResult, key: &str) -> Option<String> {
    match result.metadata.get(key)? {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Ranked FAQ entries for one request, best match first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    entries: Vec<ContextEntry>,
}

impl RetrievedContext {
    pub fn from_results(results: &[QueryResult]) -> Self {
        let mut entries: Vec<ContextEntry> = results.iter().map(ContextEntry::from_query_result).collect();
        // Stable, so equal scores keep the index's order
        entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        Self { entries }
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Human-readable context: blocks separated by a blank line, or the sentinel
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return NO_RESULTS_SENTINEL.to_string();
        }

        self.entries
            .iter()
            .map(ContextEntry::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Merge retrieved context and the user's question into the agent prompt
pub fn augment_prompt(context: &str, query: &str) -> String {
    format!(
        "Retrieved Company FAQ Information:\n{}\n\nUser Question: {}",
        context, query
    )
}
