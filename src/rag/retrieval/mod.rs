// FAQ retrieval
pub mod engine;

pub use engine::{FaqTool, Retriever, FAQ_TOP_K, TOOL_DESCRIPTION, TOOL_NAME};
