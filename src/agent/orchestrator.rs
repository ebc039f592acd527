//! Answer orchestrator - the single entry point for a user question
//!
//! Drives one request through readiness, retrieval, prompt construction and
//! the agent run. Every failure is converted into a user-facing sentence, so
//! `answer` always returns a string.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, field, info_span, warn, Instrument, Span};

use crate::agent::state::{RequestStage, StageEvent};
use crate::agent::workflow::AGENT_NAME;
use crate::config::FaqConfig;
use crate::errors::PipelineError;
use crate::rag::{augment_prompt, ResourceRegistry, Retriever};
use crate::telemetry::{ObservabilityReport, TelemetryCollector};

/// Returned when the registry could not be built
pub const INIT_FAILURE_MESSAGE: &str =
    "Backend RAG system failed to initialize. Please check server logs.";

/// Main answer orchestrator
pub struct AnswerOrchestrator {
    registry: Arc<ResourceRegistry>,
    telemetry: Arc<TelemetryCollector>,
}

impl AnswerOrchestrator {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        let service_name = registry.config().telemetry.service_name.clone();
        Self::with_telemetry(registry, Arc::new(TelemetryCollector::new(service_name)))
    }

    pub fn with_telemetry(registry: Arc<ResourceRegistry>, telemetry: Arc<TelemetryCollector>) -> Self {
        Self {
            registry,
            telemetry,
        }
    }

    /// Orchestrator backed by the local encoder, Qdrant and Ollama
    pub fn from_config(config: FaqConfig) -> Self {
        Self::new(Arc::new(ResourceRegistry::new(config)))
    }

    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    pub fn telemetry(&self) -> &Arc<TelemetryCollector> {
        &self.telemetry
    }

    pub fn snapshot(&self) -> ObservabilityReport {
        self.telemetry.snapshot(&self.registry)
    }

    /// Snapshot after settling initialization, so the report shows `ready`
    /// or `failed` rather than the untouched starting state
    pub async fn status_report(&self, initialize: bool) -> ObservabilityReport {
        if initialize {
            if let Err(e) = self.registry.ensure_ready().await {
                warn!(step = %e.step, cause = %e.cause, "Pipeline not ready");
            }
        }
        self.snapshot()
    }

    /// Answer a question. Never fails; errors come back as diagnostic text.
    pub async fn answer(&self, query: &str) -> String {
        let request_id = self.telemetry.begin_request();
        let started = Instant::now();

        let span = info_span!(
            "faq_agent_interaction",
            agent.name = AGENT_NAME,
            request.id = request_id,
            llm.model = %self.registry.config().llm.model,
            llm.prompt = field::Empty,
            llm.response = field::Empty,
            llm.response_length = field::Empty,
            llm.status = field::Empty,
            error.message = field::Empty,
            error.type = field::Empty,
            pipeline.stage = field::Empty,
        );

        let mut stage = RequestStage::Start;
        let outcome = self
            .run(query, request_id, &mut stage)
            .instrument(span.clone())
            .await;

        match outcome {
            Ok(answer) => {
                span.record("llm.response", answer.as_str());
                span.record("llm.response_length", answer.len());
                span.record("llm.status", "success");
                span.record("pipeline.stage", stage.as_str());
                self.telemetry.record_success(started.elapsed());
                debug!(request_id, elapsed_ms = started.elapsed().as_millis() as u64, "Answer produced");
                answer
            }
            Err(err) => {
                advance(&mut stage, StageEvent::Failed);
                span.record("llm.status", "error");
                span.record("error.message", err.to_string().as_str());
                span.record("error.type", err.kind());
                span.record("pipeline.stage", stage.as_str());
                self.telemetry.record_failure(request_id, &err, started.elapsed());
                warn!(request_id, kind = err.kind(), error = %err, "Request failed");
                user_message(&err)
            }
        }
    }

    async fn run(
        &self,
        query: &str,
        request_id: u64,
        stage: &mut RequestStage,
    ) -> Result<String, PipelineError> {
        advance(stage, StageEvent::Begin);
        let resources = self.registry.resources().await?;
        advance(stage, StageEvent::ResourcesReady);

        // A failed lookup still reaches the agent, with the error text as context
        let context = match resources.tool.lookup(query).await {
            Ok(context) => context,
            Err(e) => {
                warn!(request_id, error = %e, "FAQ lookup failed");
                self.telemetry.record_tool_error(request_id, &e);
                e.to_string()
            }
        };
        advance(stage, StageEvent::ContextRetrieved);

        let prompt = augment_prompt(&context, query);
        Span::current().record("llm.prompt", prompt.as_str());
        advance(stage, StageEvent::PromptBuilt);

        let answer = resources.agent.run(&prompt).await?;
        advance(stage, StageEvent::AnswerProduced);

        Ok(answer)
    }
}

fn advance(stage: &mut RequestStage, event: StageEvent) {
    match stage.transition(event) {
        Ok(next) => *stage = next,
        Err(e) => {
            warn!(error = %e, "Unexpected request stage transition");
            *stage = RequestStage::FailedReturn;
        }
    }
}

/// Natural-language text shown to the user for a failed request
pub fn user_message(err: &PipelineError) -> String {
    match err {
        PipelineError::Init(_) => INIT_FAILURE_MESSAGE.to_string(),
        PipelineError::Orchestration(e) => {
            format!("An error occurred while processing your request: {}", e)
        }
    }
}
