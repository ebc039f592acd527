//! Error types for faqbuddy
//!
//! The answer path threads these through explicit `Result`s; the only place
//! they are turned into user-facing text is `AnswerOrchestrator::answer`.

use std::fmt;
use thiserror::Error;

/// Registry acquisition steps, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitStep {
    Embedder,
    VectorIndex,
    LanguageModel,
}

impl InitStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedder => "embedding_model",
            Self::VectorIndex => "vector_index",
            Self::LanguageModel => "language_model",
        }
    }
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource registry construction failure
///
/// Cloneable because the registry keeps the settled outcome of its single
/// initialization attempt and hands it to every later caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Initialization failed at step '{step}': {cause}")]
pub struct InitError {
    pub step: InitStep,
    pub cause: String,
}

impl InitError {
    pub fn new(step: InitStep, cause: impl Into<String>) -> Self {
        Self {
            step,
            cause: cause.into(),
        }
    }

    /// Build from an anyhow chain, keeping every context layer in the cause
    pub fn from_anyhow(step: InitStep, err: &anyhow::Error) -> Self {
        Self::new(step, format!("{:#}", err))
    }
}

/// Retrieval failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Error processing query for FAQ lookup: {0}")]
    EncodingFailed(String),

    #[error("Error retrieving information from FAQs: {0}")]
    SearchFailed(String),
}

/// Agent invocation failure; displays as the bare cause text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{cause}")]
pub struct OrchestrationError {
    pub cause: String,
}

impl OrchestrationError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

/// Everything that can stop a single request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),
}

impl PipelineError {
    /// Short kind label used for span attributes and status reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init(_) => "InitError",
            Self::Orchestration(_) => "OrchestrationError",
        }
    }
}

/// Per-request state machine misuse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid stage transition from {from} on {event}")]
pub struct InvalidTransition {
    pub from: String,
    pub event: String,
}

/// Transport-level errors raised by the shipped backend clients
#[derive(Error, Debug)]
pub enum BackendError {
    /// Ollama API errors
    #[error("Ollama API error: {0}")]
    OllamaApiError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Result type alias for backend client operations
pub type Result<T> = std::result::Result<T, BackendError>;
