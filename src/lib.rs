//! docstore-mcp library
//!
//! Documentation store with semantic search, exposed over a CLI and an
//! MCP server.
//!
//! # Modules
//!
//! - `core`: document tree layout, loading, and configuration
//! - `search`: chunking, embeddings, persisted index, search engine

pub mod core;
pub mod search;

// Re-exports for convenience
pub use crate::core::config::{EmbeddingConfig, SearchConfig};
pub use crate::core::document::Document;
pub use crate::core::paths::{list_doc_files, DocFile, DocType};
pub use crate::search::engine::{invalidate_index, SearchEngine, SearchResult};
