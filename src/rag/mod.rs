// RAG (Retrieval-Augmented Generation) pipeline
//
// Components:
// - Registry: one-time construction of encoder, index, chat model, tool and agent
// - Retrieval: the FAQ lookup tool (embed query, top-3 vector search)
// - Context: formatting of retrieved entries and the augmented prompt
// - Pipeline: readiness state read by the observability adapter
// - Ingest: loading a FAQ corpus into the vector index

pub mod context;
pub mod ingest;
pub mod pipeline;
pub mod registry;
pub mod retrieval;

// Re-export key types
pub use context::{augment_prompt, ContextEntry, RetrievedContext, NO_RESULTS_SENTINEL};
pub use pipeline::{PipelineState, PipelineStatus};
pub use registry::{LocalResourceFactory, ResourceFactory, ResourceRegistry, Resources};
pub use retrieval::{FaqTool, Retriever, FAQ_TOP_K};
