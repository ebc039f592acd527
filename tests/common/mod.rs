//! Shared in-memory fakes for integration tests
//!
//! Each fake counts its calls so tests can assert that initialization side
//! effects happen exactly once.
#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use faqbuddy::agent::AnswerOrchestrator;
use faqbuddy::config::{EmbeddingConfig, FaqConfig, LlmConfig, VectorStoreConfig};
use faqbuddy::errors::InitStep;
use faqbuddy::knowledge::{Encoder, FaqRecord, QueryResult, VectorIndex};
use faqbuddy::llm::{ChatMessage, ChatModel};
use faqbuddy::rag::{ResourceFactory, ResourceRegistry};

pub const FAKE_DIMENSION: usize = 4;

/// Hit carrying question/answer metadata
pub fn faq_hit(id: &str, question: &str, answer: &str, score: f32) -> QueryResult {
    let mut metadata = HashMap::new();
    metadata.insert("question".to_string(), json!(question));
    metadata.insert("answer".to_string(), json!(answer));
    QueryResult {
        id: id.to_string(),
        score,
        document: format!("{}\n{}", question, answer),
        metadata,
    }
}

pub struct FakeEncoder {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeEncoder {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl Encoder for FakeEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("tokenizer exploded");
        }
        Ok(vec![text.len() as f32, 1.0, 0.0, 0.0])
    }

    fn dimension(&self) -> usize {
        FAKE_DIMENSION
    }

    fn model_id(&self) -> &str {
        "fake-encoder"
    }
}

pub struct FakeIndex {
    pub hits: Mutex<Vec<QueryResult>>,
    pub fail: bool,
    pub requested_top_k: Mutex<Vec<usize>>,
}

impl FakeIndex {
    pub fn with_hits(hits: Vec<QueryResult>) -> Self {
        Self {
            hits: Mutex::new(hits),
            fail: false,
            requested_top_k: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_hits(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::empty()
        }
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn query(&self, _embedding: &[f32], top_k: usize) -> Result<Vec<QueryResult>> {
        self.requested_top_k.lock().unwrap().push(top_k);
        if self.fail {
            bail!("index offline");
        }
        let mut hits = self.hits.lock().unwrap().clone();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn upsert(&self, records: Vec<FaqRecord>) -> Result<()> {
        let mut hits = self.hits.lock().unwrap();
        for record in records {
            hits.retain(|h| h.id != record.id);
            hits.push(faq_hit(&record.id, &record.question, &record.answer, 1.0));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.hits.lock().unwrap().len() as u64)
    }

    fn collection(&self) -> &str {
        "fake_faqs"
    }
}

pub struct FakeChatModel {
    reply: std::result::Result<String, String>,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeChatModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(cause: &str) -> Self {
        Self {
            reply: Err(cause.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// User message of the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .and_then(|messages| messages.last())
            .map(|m| m.content.clone())
    }
}

#[async_trait]
impl ChatModel for FakeChatModel {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(cause) => bail!("{}", cause),
        }
    }

    fn model(&self) -> &str {
        "fake-llm"
    }
}

/// Factory handing out shared fakes and counting each constructor call
pub struct CountingFactory {
    pub encoder: Arc<FakeEncoder>,
    pub index: Arc<FakeIndex>,
    pub llm: Arc<FakeChatModel>,
    pub fail_at: Option<InitStep>,
    pub delay: Duration,
    pub encoder_loads: AtomicUsize,
    pub index_opens: AtomicUsize,
    pub llm_connects: AtomicUsize,
}

impl CountingFactory {
    pub fn new(encoder: FakeEncoder, index: FakeIndex, llm: FakeChatModel) -> Self {
        Self {
            encoder: Arc::new(encoder),
            index: Arc::new(index),
            llm: Arc::new(llm),
            fail_at: None,
            delay: Duration::ZERO,
            encoder_loads: AtomicUsize::new(0),
            index_opens: AtomicUsize::new(0),
            llm_connects: AtomicUsize::new(0),
        }
    }

    /// Working fakes answering `reply` over `hits`
    pub fn answering(hits: Vec<QueryResult>, reply: &str) -> Self {
        Self::new(
            FakeEncoder::new(),
            FakeIndex::with_hits(hits),
            FakeChatModel::replying(reply),
        )
    }

    pub fn failing_at(step: InitStep) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::answering(Vec::new(), "unused")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn total_constructions(&self) -> usize {
        self.encoder_loads.load(Ordering::SeqCst)
            + self.index_opens.load(Ordering::SeqCst)
            + self.llm_connects.load(Ordering::SeqCst)
    }

    async fn step(&self, step: InitStep, counter: &AtomicUsize) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_at == Some(step) {
            bail!("{} unavailable", step);
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceFactory for CountingFactory {
    async fn load_encoder(&self, _config: &EmbeddingConfig) -> Result<Arc<dyn Encoder>> {
        self.step(InitStep::Embedder, &self.encoder_loads).await?;
        Ok(self.encoder.clone())
    }

    async fn open_index(
        &self,
        _config: &VectorStoreConfig,
        dimension: usize,
    ) -> Result<Arc<dyn VectorIndex>> {
        assert_eq!(dimension, FAKE_DIMENSION);
        self.step(InitStep::VectorIndex, &self.index_opens).await?;
        Ok(self.index.clone())
    }

    async fn connect_llm(&self, _config: &LlmConfig) -> Result<Arc<dyn ChatModel>> {
        self.step(InitStep::LanguageModel, &self.llm_connects).await?;
        Ok(self.llm.clone())
    }
}

pub fn registry(factory: Arc<CountingFactory>) -> Arc<ResourceRegistry> {
    Arc::new(ResourceRegistry::with_factory(FaqConfig::default(), factory))
}

pub fn orchestrator(factory: Arc<CountingFactory>) -> AnswerOrchestrator {
    AnswerOrchestrator::new(registry(factory))
}

/// Field values recorded on one span, rendered as text
#[derive(Debug, Clone, Default)]
pub struct SpanFields(pub HashMap<String, String>);

impl SpanFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl Visit for SpanFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

/// Layer that keeps the fields of every closed span with the given name
#[derive(Clone)]
pub struct SpanCapture {
    name: &'static str,
    pub closed: Arc<Mutex<Vec<SpanFields>>>,
}

impl SpanCapture {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            closed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn spans(&self) -> Vec<SpanFields> {
        self.closed.lock().unwrap().clone()
    }
}

impl<S> Layer<S> for SpanCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if attrs.metadata().name() != self.name {
            return;
        }
        let mut fields = SpanFields::default();
        attrs.record(&mut fields);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(fields);
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(fields) = span.extensions_mut().get_mut::<SpanFields>() {
                values.record(fields);
            }
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(&id) {
            if let Some(fields) = span.extensions_mut().remove::<SpanFields>() {
                self.closed.lock().unwrap().push(fields);
            }
        }
    }
}
