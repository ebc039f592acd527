pub mod engine;

pub use engine::EmbeddingEngine;
