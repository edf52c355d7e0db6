//! Semantic search engine: chunker + embedding provider + index store.
//!
//! The engine never watches the filesystem. It loads the persisted index
//! on each search, drops it if any source document changed or vanished,
//! rebuilds when absent, and scores every chunk against the embedded
//! query. Invalidation after a document mutation is the mutating caller's
//! job (see [`invalidate_index`]).

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::chunking::chunk_text;
use super::embedding::{cosine_similarity, EmbeddingProvider};
use super::index_store::{EmbeddingIndex, IndexStore, IndexedChunk, IndexedDocument};
use crate::core::config::SearchConfig;
use crate::core::document::Document;
use crate::core::paths::{list_doc_files, DocType};

/// Default number of results returned by a search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Result snippets are truncated to this many characters.
const SNIPPET_CHARS: usize = 200;

/// A ranked hit: where it came from and how well it matched.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub doc_type: DocType,
    pub slug: String,
    pub score: f32,
    pub snippet: String,
}

/// What happened to an index build request.
#[derive(Debug)]
pub enum IndexState {
    /// No embedding provider configured.
    Disabled,
    /// The persisted index exists and matches the document tree.
    Fresh,
    /// A new index was built and saved.
    Built(BuildStats),
}

#[derive(Debug)]
pub struct BuildStats {
    pub documents: usize,
    pub chunks: usize,
    pub skipped: usize,
    pub duration_ms: u128,
}

/// Orchestrates index lifecycle and query scoring for one project root.
pub struct SearchEngine {
    root: PathBuf,
    store: IndexStore,
    provider: Option<Box<dyn EmbeddingProvider>>,
}

impl SearchEngine {
    pub fn new(root: &Path, config: &SearchConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            store: IndexStore::for_project(root),
            provider: config.resolve_provider(),
        }
    }

    /// Whether an embedding provider is configured.
    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Rank all indexed chunks against `query`, best first.
    ///
    /// Returns an empty list (never an error) when no provider is
    /// configured. The index is rebuilt first if missing or stale; the
    /// persisted index always spans all doc types, so `doc_type` filtering
    /// happens at scoring time.
    pub fn search(
        &self,
        query: &str,
        doc_type: Option<DocType>,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let provider = match &self.provider {
            Some(p) => p,
            None => return Ok(Vec::new()),
        };
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let index = self.get_or_build_index(provider.as_ref())?;
        let query_embedding = provider.embed(query)?;

        let mut scored = Vec::new();
        for doc in &index.docs {
            if doc_type.is_some_and(|t| doc.doc_type != t) {
                continue;
            }
            for chunk in &doc.chunks {
                if chunk.embedding.is_empty() {
                    continue;
                }
                let score = cosine_similarity(&query_embedding, &chunk.embedding);
                scored.push(SearchResult {
                    doc_type: doc.doc_type,
                    slug: doc.slug.clone(),
                    score,
                    snippet: snippet(&chunk.text),
                });
            }
        }

        // Stable sort keeps enumeration order among equal scores.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    /// Make sure the persisted index matches the document tree, building
    /// it if needed.
    pub fn ensure_index(&self) -> Result<IndexState> {
        let provider = match &self.provider {
            Some(p) => p,
            None => return Ok(IndexState::Disabled),
        };
        if let Some(index) = self.store.load() {
            if !self.store.is_stale(&index) {
                return Ok(IndexState::Fresh);
            }
            self.store.delete()?;
        }
        let (_, stats) = self.build_index(provider.as_ref())?;
        Ok(IndexState::Built(stats))
    }

    /// Drop any persisted index and build from scratch.
    pub fn rebuild_index(&self) -> Result<IndexState> {
        let provider = match &self.provider {
            Some(p) => p,
            None => return Ok(IndexState::Disabled),
        };
        self.store.delete()?;
        let (_, stats) = self.build_index(provider.as_ref())?;
        Ok(IndexState::Built(stats))
    }

    fn get_or_build_index(&self, provider: &dyn EmbeddingProvider) -> Result<EmbeddingIndex> {
        if let Some(index) = self.store.load() {
            if !self.store.is_stale(&index) {
                return Ok(index);
            }
            // One changed document invalidates the whole index.
            self.store.delete()?;
        }
        let (index, _) = self.build_index(provider)?;
        Ok(index)
    }

    /// Index every document across all doc types and persist the result.
    ///
    /// A document that fails to read is skipped with a warning; the build
    /// continues. Documents that chunk to nothing are still recorded (with
    /// no chunks) so they are not re-read on every search. Each document's
    /// chunks are embedded in a single batch call.
    fn build_index(
        &self,
        provider: &dyn EmbeddingProvider,
    ) -> Result<(EmbeddingIndex, BuildStats)> {
        let started = std::time::Instant::now();
        let files = list_doc_files(&self.root, None);

        let mut docs = Vec::new();
        let mut skipped = 0usize;
        for file in &files {
            let doc = match Document::load(file) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("Skipping {}/{}: {}", file.doc_type, file.slug, e);
                    skipped += 1;
                    continue;
                }
            };

            let chunks = chunk_text(&doc.content);
            let indexed: Vec<IndexedChunk> = if chunks.is_empty() {
                Vec::new()
            } else {
                let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
                let embeddings = provider.embed_batch(&texts)?;
                chunks
                    .into_iter()
                    .enumerate()
                    .map(|(i, c)| IndexedChunk {
                        text: c.text,
                        start: c.start,
                        end: c.end,
                        embedding: embeddings.get(i).cloned().unwrap_or_default(),
                    })
                    .collect()
            };

            docs.push(IndexedDocument {
                doc_type: doc.doc_type,
                slug: doc.slug,
                path: doc.path,
                mtime: doc.mtime,
                chunks: indexed,
            });
        }

        let index = EmbeddingIndex::new(docs);
        self.store.save(&index)?;

        let stats = BuildStats {
            documents: index.docs.len(),
            chunks: index.chunk_count(),
            skipped,
            duration_ms: started.elapsed().as_millis(),
        };
        Ok((index, stats))
    }
}

/// Remove the persisted index for a project root.
///
/// Call this after every document create/write/delete; the engine will
/// rebuild on its next search.
pub fn invalidate_index(root: &Path) -> Result<()> {
    IndexStore::for_project(root).delete()
}

fn snippet(text: &str) -> String {
    let mut out: String = text.chars().take(SNIPPET_CHARS).collect();
    if text.chars().count() > SNIPPET_CHARS {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::doc_path;
    use std::fs;
    use tempfile::TempDir;

    fn write_doc(root: &Path, doc_type: DocType, slug: &str, content: &str) {
        let path = doc_path(root, doc_type, slug).unwrap();
        fs::write(path, content).unwrap();
    }

    fn local_engine(root: &Path) -> SearchEngine {
        SearchEngine::new(root, &SearchConfig::local())
    }

    #[test]
    fn test_disabled_provider_returns_empty() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), DocType::Api, "orders", "Orders API content");

        let engine = SearchEngine::new(tmp.path(), &SearchConfig::default());
        assert!(!engine.is_enabled());

        let results = engine.search("anything", None, 10).unwrap();
        assert!(results.is_empty());
        // Disabled search must not build an index either.
        assert!(engine.store().load().is_none());
        assert!(matches!(engine.ensure_index().unwrap(), IndexState::Disabled));
    }

    #[test]
    fn test_zero_documents_builds_empty_index() {
        let tmp = TempDir::new().unwrap();
        let engine = local_engine(tmp.path());

        let results = engine.search("anything", None, 10).unwrap();
        assert!(results.is_empty());

        let index = engine.store().load().unwrap();
        assert!(index.docs.is_empty());
    }

    #[test]
    fn test_identical_chunk_query_ranks_first_with_full_score() {
        let tmp = TempDir::new().unwrap();
        let content = format!("Orders API\n\n{}", "x".repeat(1000));
        write_doc(tmp.path(), DocType::Api, "orders", &content);

        let engine = local_engine(tmp.path());
        // Query with the exact text of the first chunk.
        let first_chunk = chunk_text(&content).remove(0);
        let results = engine.search(&first_chunk.text, None, 10).unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].doc_type, DocType::Api);
        assert_eq!(results[0].slug, "orders.md");
        assert!(results[0].score > 0.999);
        assert!(results[0].snippet.ends_with('…'));
        assert_eq!(results[0].snippet.chars().count(), 201);
    }

    #[test]
    fn test_scores_non_increasing_and_limit_truncates() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), DocType::Api, "orders", "payment orders and refunds");
        write_doc(tmp.path(), DocType::Jtbd, "jobs", "customer hires the product");
        write_doc(
            tmp.path(),
            DocType::UserStories,
            "checkout",
            "as a shopper I pay for my orders",
        );

        let engine = local_engine(tmp.path());
        let all = engine.search("orders payment", None, 10).unwrap();
        assert!(all.len() >= 3);
        for pair in all.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }

        let top = engine.search("orders payment", None, 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].slug, all[0].slug);
        assert_eq!(top[1].slug, all[1].slug);
    }

    #[test]
    fn test_doc_type_filter() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), DocType::Api, "orders", "orders endpoint spec");
        write_doc(tmp.path(), DocType::Jtbd, "orders", "orders job story");

        let engine = local_engine(tmp.path());
        let results = engine.search("orders", Some(DocType::Jtbd), 10).unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.doc_type == DocType::Jtbd));
    }

    #[test]
    fn test_whitespace_only_document_recorded_without_chunks() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), DocType::Api, "blank", "   \n\n  ");
        write_doc(tmp.path(), DocType::Api, "real", "actual content here");

        let engine = local_engine(tmp.path());
        engine.search("content", None, 10).unwrap();

        let index = engine.store().load().unwrap();
        assert_eq!(index.docs.len(), 2);
        let blank = index.docs.iter().find(|d| d.slug == "blank.md").unwrap();
        assert!(blank.chunks.is_empty());
    }

    #[test]
    fn test_unreadable_document_skipped_build_continues() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), DocType::Api, "good", "readable content");
        // Invalid UTF-8 makes this one unreadable as text.
        let bad = doc_path(tmp.path(), DocType::Api, "bad").unwrap();
        fs::write(&bad, [0xff, 0xfe, 0xfd]).unwrap();

        let engine = local_engine(tmp.path());
        let state = engine.ensure_index().unwrap();
        match state {
            IndexState::Built(stats) => {
                assert_eq!(stats.documents, 1);
                assert_eq!(stats.skipped, 1);
            }
            other => panic!("expected a build, got {:?}", other),
        }

        let index = engine.store().load().unwrap();
        assert_eq!(index.docs.len(), 1);
        assert_eq!(index.docs[0].slug, "good.md");
    }

    #[test]
    fn test_stale_index_is_rebuilt_on_search() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), DocType::Api, "orders", "original content");

        let engine = local_engine(tmp.path());
        engine.search("original", None, 10).unwrap();

        // Corrupt the recorded mtime so the index reads as stale.
        let mut index = engine.store().load().unwrap();
        index.docs[0].mtime += 1;
        engine.store().save(&index).unwrap();

        engine.search("original", None, 10).unwrap();
        let rebuilt = engine.store().load().unwrap();
        assert_eq!(
            rebuilt.docs[0].mtime,
            crate::core::document::mtime_millis(&rebuilt.docs[0].path).unwrap()
        );
    }

    #[test]
    fn test_invalidate_then_search_reindexes_new_content() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), DocType::Api, "orders", "first version");

        let engine = local_engine(tmp.path());
        engine.search("first", None, 10).unwrap();
        assert!(engine.store().load().is_some());

        // The CRUD layer mutates a document and invalidates.
        write_doc(tmp.path(), DocType::Api, "payments", "refund handling");
        invalidate_index(tmp.path()).unwrap();
        assert!(engine.store().load().is_none());

        engine.search("refund", None, 10).unwrap();
        let rebuilt = engine.store().load().unwrap();
        assert_eq!(rebuilt.docs.len(), 2);
    }

    #[test]
    fn test_mismatched_embedding_dimensions_score_zero() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), DocType::Api, "orders", "orders content");

        let engine = local_engine(tmp.path());
        engine.ensure_index().unwrap();

        // Rewrite the stored vectors with a foreign dimensionality.
        let mut index = engine.store().load().unwrap();
        for chunk in &mut index.docs[0].chunks {
            chunk.embedding = vec![0.5, 0.5, 0.5];
        }
        engine.store().save(&index).unwrap();

        let results = engine.search("orders content", None, 10).unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_rebuild_index_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), DocType::Api, "orders", "orders content");

        let engine = local_engine(tmp.path());
        assert!(matches!(
            engine.ensure_index().unwrap(),
            IndexState::Built(_)
        ));
        assert!(matches!(engine.ensure_index().unwrap(), IndexState::Fresh));
        assert!(matches!(
            engine.rebuild_index().unwrap(),
            IndexState::Built(_)
        ));
    }
}
