//! Telemetry for faqbuddy
//!
//! Collects request counters and the last failure, produces the status report
//! consumed by health endpoints, and installs the tracing subscriber that
//! receives the per-request spans.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, TelemetryConfig};
use crate::errors::{PipelineError, ToolError};
use crate::rag::{PipelineState, ResourceRegistry};

/// Most recent failure seen by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub request_id: u64,
    pub kind: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Request statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetryStats {
    /// Monotonic; also the sequence number of the latest request
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Lookups that degraded to a diagnostic context
    pub tool_errors: u64,
    pub last_error: Option<ErrorRecord>,
    pub last_latency_ms: Option<u64>,
}

/// Telemetry collector
pub struct TelemetryCollector {
    service_name: String,
    stats: Mutex<TelemetryStats>,
    start_time: Instant,
}

impl TelemetryCollector {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            stats: Mutex::new(TelemetryStats::default()),
            start_time: Instant::now(),
        }
    }

    fn stats_mut(&self) -> MutexGuard<'_, TelemetryStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count a new request and return its sequence number (1-based)
    pub fn begin_request(&self) -> u64 {
        let mut stats = self.stats_mut();
        stats.total_requests += 1;
        stats.total_requests
    }

    pub fn record_success(&self, latency: Duration) {
        let mut stats = self.stats_mut();
        stats.successful_requests += 1;
        stats.last_latency_ms = Some(latency.as_millis() as u64);
    }

    pub fn record_failure(&self, request_id: u64, err: &PipelineError, latency: Duration) {
        let mut stats = self.stats_mut();
        stats.failed_requests += 1;
        stats.last_latency_ms = Some(latency.as_millis() as u64);
        stats.last_error = Some(ErrorRecord {
            request_id,
            kind: err.kind().to_string(),
            message: err.to_string(),
            at: Utc::now(),
        });
    }

    pub fn record_tool_error(&self, request_id: u64, err: &ToolError) {
        let mut stats = self.stats_mut();
        stats.tool_errors += 1;
        stats.last_error = Some(ErrorRecord {
            request_id,
            kind: "ToolError".to_string(),
            message: err.to_string(),
            at: Utc::now(),
        });
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        self.stats_mut().clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self, registry: &ResourceRegistry) -> ObservabilityReport {
        let config = registry.config();

        ObservabilityReport {
            opentelemetry: TracerReport {
                tracer_ready: tracer_ready(),
                service_name: self.service_name.clone(),
                uptime_secs: self.elapsed().as_secs(),
            },
            rag_system: RagSystemReport {
                state: registry.state(),
                embedding_model: config.embedding.model_id.clone(),
                vector_store: config.vector_store.url.clone(),
                collection: config.vector_store.collection.clone(),
                llm_model: config.llm.model.clone(),
                requests: self.get_stats(),
            },
            timestamp: Utc::now(),
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new("faqbuddy")
    }
}

/// Status document for health/observability endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ObservabilityReport {
    pub opentelemetry: TracerReport,
    pub rag_system: RagSystemReport,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TracerReport {
    pub tracer_ready: bool,
    pub service_name: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RagSystemReport {
    #[serde(flatten)]
    pub state: PipelineState,
    pub embedding_model: String,
    pub vector_store: String,
    pub collection: String,
    pub llm_model: String,
    #[serde(flatten)]
    pub requests: TelemetryStats,
}

/// Whether a global subscriber is receiving spans
pub fn tracer_ready() -> bool {
    tracing::dispatcher::has_been_set()
}

/// Install the global subscriber. Returns `false` when one already exists.
pub fn init_tracing(config: &TelemetryConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let result = match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    result.is_ok()
}
