//! Search configuration resolved once at startup.
//!
//! Semantic search is opt-in: it activates only when
//! `DOCS_EMBEDDING_PROVIDER=local` is set. Everything downstream receives
//! this struct instead of reading the environment ad hoc.

use crate::search::embedding::{EmbeddingProvider, LocalEmbedder};

/// Env var selecting the embedding provider (`local`, or unset to disable).
pub const EMBEDDING_PROVIDER_ENV: &str = "DOCS_EMBEDDING_PROVIDER";

/// Env var naming the embedding model within a provider.
pub const EMBEDDING_MODEL_ENV: &str = "DOCS_EMBEDDING_MODEL";

/// Which embedding capability is available, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EmbeddingConfig {
    /// No provider configured; semantic search returns empty results.
    #[default]
    Disabled,
    /// Deterministic in-process embedder. The model name is accepted for
    /// configuration parity but the local embedder needs no model file.
    Local { model: Option<String> },
}

/// Settings for the semantic search subsystem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchConfig {
    pub embedding: EmbeddingConfig,
}

impl SearchConfig {
    /// Read provider selection from the environment.
    pub fn from_env() -> Self {
        let provider = std::env::var(EMBEDDING_PROVIDER_ENV)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_default();

        let embedding = if provider == "local" {
            let model = std::env::var(EMBEDDING_MODEL_ENV)
                .ok()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty());
            EmbeddingConfig::Local { model }
        } else {
            EmbeddingConfig::Disabled
        };

        Self { embedding }
    }

    pub fn local() -> Self {
        Self {
            embedding: EmbeddingConfig::Local { model: None },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.embedding != EmbeddingConfig::Disabled
    }

    /// Instantiate the configured provider, or `None` when disabled.
    pub fn resolve_provider(&self) -> Option<Box<dyn EmbeddingProvider>> {
        match &self.embedding {
            EmbeddingConfig::Disabled => None,
            EmbeddingConfig::Local { .. } => Some(Box::new(LocalEmbedder::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_resolves_to_none() {
        let config = SearchConfig::default();
        assert!(!config.is_enabled());
        assert!(config.resolve_provider().is_none());
    }

    #[test]
    fn test_local_resolves_to_provider() {
        let config = SearchConfig::local();
        assert!(config.is_enabled());
        let provider = config.resolve_provider().unwrap();
        let v = provider.embed("hello").unwrap();
        assert!(!v.is_empty());
    }
}
