//! faqbuddy - Company FAQ Assistant
//!
//! A retrieval-augmented answer pipeline: questions are embedded locally,
//! matched against a Qdrant FAQ collection, and answered by an Ollama model
//! primed with the retrieved entries.
//!
//! # Architecture
//!
//! - **rag**: resource registry, FAQ lookup tool, context formatting, ingestion
//! - **agent**: the FAQ agent workflow and the answer orchestrator
//! - **knowledge**: encoder and vector index boundaries (candle, Qdrant)
//! - **llm**: chat model boundary (Ollama)
//! - **telemetry**: request statistics, status report, tracing setup

pub mod errors;
pub mod config;
pub mod knowledge;
pub mod llm;
pub mod rag;
pub mod agent;
pub mod telemetry;
pub mod cli;

// Re-export commonly used types
pub use agent::AnswerOrchestrator;
pub use config::FaqConfig;
pub use errors::{InitError, OrchestrationError, PipelineError, ToolError};
pub use rag::{PipelineState, PipelineStatus, ResourceRegistry};
pub use telemetry::{ObservabilityReport, TelemetryCollector};
