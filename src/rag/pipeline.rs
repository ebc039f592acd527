// RAG pipeline readiness state
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{InitError, InitStep};

/// Lifecycle of the shared pipeline resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    /// Terminal until the process restarts
    Failed,
}

/// Readiness flags owned by the resource registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub embedder_ready: bool,
    pub index_ready: bool,
    pub llm_ready: bool,
    pub tool_ready: bool,
    pub workflow_ready: bool,
    pub status: PipelineStatus,
    /// Failing step and cause, once initialization has failed
    pub init_error: Option<String>,
    pub initialized_at: Option<DateTime<Utc>>,
}

impl PipelineState {
    pub fn all_ready(&self) -> bool {
        self.embedder_ready && self.index_ready && self.llm_ready && self.tool_ready && self.workflow_ready
    }

    /// First acquisition step that has not completed
    pub fn pending_step(&self) -> InitStep {
        if !self.embedder_ready {
            InitStep::Embedder
        } else if !self.index_ready {
            InitStep::VectorIndex
        } else {
            InitStep::LanguageModel
        }
    }

    pub(crate) fn begin(&mut self) {
        *self = Self {
            status: PipelineStatus::Initializing,
            ..Self::default()
        };
    }

    pub(crate) fn mark_ready(&mut self) {
        self.status = PipelineStatus::Ready;
        self.init_error = None;
        self.initialized_at = Some(Utc::now());
    }

    pub(crate) fn mark_failed(&mut self, err: &InitError) {
        self.status = PipelineStatus::Failed;
        self.init_error = Some(err.to_string());
    }
}
