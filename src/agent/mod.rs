//! Agent orchestration module
//!
//! The FAQ agent workflow, the per-request stage machine, and the orchestrator
//! that ties retrieval and the agent together behind `answer`.

pub mod orchestrator;
pub mod state;
pub mod workflow;

// Re-export commonly used types
pub use orchestrator::{user_message, AnswerOrchestrator, INIT_FAILURE_MESSAGE};
pub use state::{RequestStage, StageEvent};
pub use workflow::{Agent, FaqAgent, ToolDescriptor, AGENT_NAME, WORKFLOW_NAME};
