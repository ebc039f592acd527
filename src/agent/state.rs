//! Per-request state machine
//!
//! Every `answer` call walks:
//!
//! ```text
//! Start → EnsureReady → Retrieve → PromptBuild → AgentInvoke → Return
//! ```
//!
//! and any non-terminal stage may drop to `FailedReturn`, which still yields
//! a string to the caller. There is no retry edge.

use crate::errors::InvalidTransition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStage {
    Start,
    EnsureReady,
    Retrieve,
    PromptBuild,
    AgentInvoke,
    /// Final answer produced (terminal)
    Return,
    /// Fallback message produced (terminal)
    FailedReturn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    Begin,
    ResourcesReady,
    ContextRetrieved,
    PromptBuilt,
    AnswerProduced,
    Failed,
}

impl RequestStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStage::Return | RequestStage::FailedReturn)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStage::Start => "start",
            RequestStage::EnsureReady => "ensure_ready",
            RequestStage::Retrieve => "retrieve",
            RequestStage::PromptBuild => "prompt_build",
            RequestStage::AgentInvoke => "agent_invoke",
            RequestStage::Return => "return",
            RequestStage::FailedReturn => "failed_return",
        }
    }

    pub fn transition(&self, event: StageEvent) -> Result<RequestStage, InvalidTransition> {
        use RequestStage::*;
        use StageEvent::*;

        let next = match (self, event) {
            (Start, Begin) => EnsureReady,
            (EnsureReady, ResourcesReady) => Retrieve,
            (Retrieve, ContextRetrieved) => PromptBuild,
            (PromptBuild, PromptBuilt) => AgentInvoke,
            (AgentInvoke, AnswerProduced) => Return,
            (stage, Failed) if !stage.is_terminal() => FailedReturn,
            (stage, event) => {
                return Err(InvalidTransition {
                    from: stage.as_str().to_string(),
                    event: format!("{:?}", event),
                })
            }
        };

        Ok(next)
    }
}
