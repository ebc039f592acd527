// Resource registry: one-time construction of the shared pipeline handles
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::agent::workflow::{Agent, FaqAgent, ToolDescriptor, WORKFLOW_NAME};
use crate::config::{EmbeddingConfig, FaqConfig, LlmConfig, VectorStoreConfig};
use crate::errors::{InitError, InitStep};
use crate::knowledge::{EmbeddingEngine, Encoder, VectorDBManager, VectorIndex};
use crate::llm::{ChatModel, OllamaClient};
use crate::rag::pipeline::PipelineState;
use crate::rag::retrieval::{FaqTool, Retriever};

/// Handles shared by every request once the registry is ready
pub struct Resources {
    pub encoder: Arc<dyn Encoder>,
    pub index: Arc<dyn VectorIndex>,
    pub llm: Arc<dyn ChatModel>,
    pub tool: Arc<dyn Retriever>,
    pub agent: Arc<dyn Agent>,
}

/// Constructors for the external collaborators
#[async_trait]
pub trait ResourceFactory: Send + Sync {
    async fn load_encoder(&self, config: &EmbeddingConfig) -> Result<Arc<dyn Encoder>>;

    async fn open_index(
        &self,
        config: &VectorStoreConfig,
        dimension: usize,
    ) -> Result<Arc<dyn VectorIndex>>;

    async fn connect_llm(&self, config: &LlmConfig) -> Result<Arc<dyn ChatModel>>;
}

/// Candle encoder + Qdrant index + Ollama chat model
pub struct LocalResourceFactory;

#[async_trait]
impl ResourceFactory for LocalResourceFactory {
    async fn load_encoder(&self, config: &EmbeddingConfig) -> Result<Arc<dyn Encoder>> {
        let model_id = config.model_id.clone();
        let engine = tokio::task::spawn_blocking(move || EmbeddingEngine::load(&model_id))
            .await
            .context("Embedding loader panicked")??;
        Ok(Arc::new(engine))
    }

    async fn open_index(
        &self,
        config: &VectorStoreConfig,
        dimension: usize,
    ) -> Result<Arc<dyn VectorIndex>> {
        let manager = VectorDBManager::open_or_create(&config.url, &config.collection, dimension).await?;
        Ok(Arc::new(manager))
    }

    async fn connect_llm(&self, config: &LlmConfig) -> Result<Arc<dyn ChatModel>> {
        let client = OllamaClient::with_config(
            &config.ollama_url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Arc::new(client))
    }
}

/// Owns the lazily-built pipeline resources.
///
/// The first `ensure_ready` spawns the acquisition sequence as its own task
/// and every caller, including later ones, awaits that one shared outcome.
/// Dropping a caller never cancels the task, and its result, success or
/// failure, is kept for the registry's lifetime.
pub struct ResourceRegistry {
    inner: Arc<RegistryInner>,
    init: Mutex<Option<InitFuture>>,
}

type InitFuture = Shared<BoxFuture<'static, std::result::Result<Arc<Resources>, InitError>>>;

struct RegistryInner {
    config: FaqConfig,
    factory: Arc<dyn ResourceFactory>,
    state: RwLock<PipelineState>,
}

impl ResourceRegistry {
    pub fn new(config: FaqConfig) -> Self {
        Self::with_factory(config, Arc::new(LocalResourceFactory))
    }

    pub fn with_factory(config: FaqConfig, factory: Arc<dyn ResourceFactory>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                config,
                factory,
                state: RwLock::new(PipelineState::default()),
            }),
            init: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &FaqConfig {
        &self.inner.config
    }

    /// Snapshot of the readiness flags
    pub fn state(&self) -> PipelineState {
        self.inner.state()
    }

    pub async fn ensure_ready(&self) -> std::result::Result<(), InitError> {
        self.resources().await.map(|_| ())
    }

    /// Ready handles, initializing on first use
    pub async fn resources(&self) -> std::result::Result<Arc<Resources>, InitError> {
        let init = self.init_future();

        if let Some(settled) = init.peek() {
            debug!("RAG system already set up");
            return settled.clone();
        }

        init.await
    }

    fn init_future(&self) -> InitFuture {
        let mut slot = self.init.lock().unwrap_or_else(PoisonError::into_inner);

        slot.get_or_insert_with(|| {
            let inner = self.inner.clone();
            let task = tokio::spawn({
                let inner = inner.clone();
                async move { inner.initialize().await }
            });

            async move {
                match task.await {
                    Ok(outcome) => outcome,
                    Err(join_err) => {
                        let err = InitError::new(
                            inner.state().pending_step(),
                            format!("initialization task aborted: {}", join_err),
                        );
                        inner.update(|s| s.mark_failed(&err));
                        error!(step = %err.step, cause = %err.cause, "RAG system initialization failed");
                        Err(err)
                    }
                }
            }
            .boxed()
            .shared()
        })
        .clone()
    }
}

impl RegistryInner {
    fn state(&self) -> PipelineState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update<F: FnOnce(&mut PipelineState)>(&self, f: F) {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner));
    }

    async fn initialize(&self) -> std::result::Result<Arc<Resources>, InitError> {
        info!("Setting up RAG system components");
        self.update(PipelineState::begin);

        let outcome = self.acquire().await;
        match &outcome {
            Ok(_) => {
                self.update(PipelineState::mark_ready);
                info!("RAG system initialized");
            }
            Err(err) => {
                self.update(|s| s.mark_failed(err));
                error!(step = %err.step, cause = %err.cause, "RAG system initialization failed");
            }
        }
        outcome
    }

    async fn acquire(&self) -> std::result::Result<Arc<Resources>, InitError> {
        let encoder = self
            .factory
            .load_encoder(&self.config.embedding)
            .await
            .map_err(|e| InitError::from_anyhow(InitStep::Embedder, &e))?;
        self.update(|s| s.embedder_ready = true);
        info!(model_id = encoder.model_id(), dimension = encoder.dimension(), "Embedding model ready");

        let index = self
            .factory
            .open_index(&self.config.vector_store, encoder.dimension())
            .await
            .map_err(|e| InitError::from_anyhow(InitStep::VectorIndex, &e))?;
        self.update(|s| s.index_ready = true);
        match index.count().await {
            Ok(count) => info!(collection = index.collection(), documents = count, "Vector collection ready"),
            Err(e) => warn!(collection = index.collection(), error = %e, "Vector collection ready, count unavailable"),
        }

        let llm = self
            .factory
            .connect_llm(&self.config.llm)
            .await
            .map_err(|e| InitError::from_anyhow(InitStep::LanguageModel, &e))?;
        self.update(|s| s.llm_ready = true);
        info!(model = llm.model(), "Language model client ready");

        let tool: Arc<dyn Retriever> = Arc::new(FaqTool::new(encoder.clone(), index.clone()));
        self.update(|s| s.tool_ready = true);

        let agent: Arc<dyn Agent> = Arc::new(FaqAgent::new(
            llm.clone(),
            vec![ToolDescriptor::of(tool.as_ref())],
        ));
        self.update(|s| s.workflow_ready = true);
        info!(workflow = WORKFLOW_NAME, agent = agent.name(), "Agent workflow created");

        Ok(Arc::new(Resources {
            encoder,
            index,
            llm,
            tool,
            agent,
        }))
    }
}
