//! FAQ agent workflow
//!
//! Adapts the `ChatModel` boundary into a single-shot agent: a fixed role and
//! instruction set, the tools it may mention, one user prompt in, one final
//! answer out. No conversation state survives between runs.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::errors::OrchestrationError;
use crate::llm::{ChatMessage, ChatModel};
use crate::rag::retrieval::Retriever;

pub const WORKFLOW_NAME: &str = "Company FAQ Assistant";

pub const AGENT_NAME: &str = "FAQAgent";

pub const AGENT_ROLE: &str = "An expert in company FAQs.";

pub const AGENT_INSTRUCTIONS: &str = "You are an expert in company FAQs. Your primary goal is to answer \
questions based on the provided company FAQ information. If company FAQ information is provided in the \
input, prioritize using it to answer the user's question. If no relevant company FAQ information is \
provided or found, state that you cannot find the answer in the company FAQs. Do NOT try to use the \
'faq_lookup_tool' on your own if context is already provided, as the information has already been \
retrieved for you.";

/// Prompt in, final answer out
#[async_trait]
pub trait Agent: Send + Sync {
    async fn run(&self, prompt: &str) -> Result<String, OrchestrationError>;

    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

/// Name and description of a tool the agent is told about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

impl ToolDescriptor {
    pub fn of(tool: &dyn Retriever) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
        }
    }
}

/// The company-FAQ agent bound to one language model
pub struct FaqAgent {
    llm: Arc<dyn ChatModel>,
    system_prompt: String,
}

impl FaqAgent {
    pub fn new(llm: Arc<dyn ChatModel>, tools: Vec<ToolDescriptor>) -> Self {
        let system_prompt = build_system_prompt(AGENT_ROLE, AGENT_INSTRUCTIONS, &tools);
        Self { llm, system_prompt }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

fn build_system_prompt(role: &str, instructions: &str, tools: &[ToolDescriptor]) -> String {
    let mut prompt = format!("Role: {}\n\nInstructions: {}", role, instructions);

    if !tools.is_empty() {
        prompt.push_str("\n\nTools available to you:");
        for tool in tools {
            prompt.push_str(&format!("\n- {}: {}", tool.name, tool.description));
        }
    }

    prompt
}

#[async_trait]
impl Agent for FaqAgent {
    async fn run(&self, prompt: &str) -> Result<String, OrchestrationError> {
        let messages = [
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(prompt),
        ];

        let reply = self
            .llm
            .chat(&messages)
            .await
            .map_err(|e| OrchestrationError::new(format!("{:#}", e)))?;

        let answer = reply.trim();
        if answer.is_empty() {
            return Err(OrchestrationError::new("The agent returned an empty answer"));
        }

        debug!(agent = AGENT_NAME, chars = answer.len(), "Agent produced final answer");
        Ok(answer.to_string())
    }

    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn model(&self) -> &str {
        self.llm.model()
    }
}
