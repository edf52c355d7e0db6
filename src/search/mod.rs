//! Semantic search subsystem.
//!
//! Pipeline: document tree → chunker → embedding provider → index store
//! on build; query → embedding provider → similarity ranking on search.

pub mod chunking;
pub mod embedding;
pub mod engine;
pub mod index_store;

pub use chunking::{chunk_text, Chunk};
pub use embedding::{cosine_similarity, EmbeddingProvider, LocalEmbedder};
pub use engine::{invalidate_index, SearchEngine, SearchResult};
pub use index_store::{EmbeddingIndex, IndexStore};
