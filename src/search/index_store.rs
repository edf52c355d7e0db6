//! On-disk persistence for the embedding index.
//!
//! One JSON file per project root, at
//! `.document-manager/embedding-index.json`. The file is derived data: it
//! is version-gated, discarded wholesale on any mismatch or corruption,
//! and rebuilt from the document tree. Readers never see a half-written
//! file — saves go through a temp file renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::document::mtime_millis;
use crate::core::paths::DocType;

const INDEX_DIR: &str = ".document-manager";
const INDEX_FILENAME: &str = "embedding-index.json";

/// Schema version; any other value on disk means "no index".
pub const INDEX_VERSION: u32 = 1;

/// A chunk with its embedding, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub embedding: Vec<f32>,
}

/// One document's chunks plus the mtime observed when it was indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedDocument {
    pub doc_type: DocType,
    pub slug: String,
    pub path: PathBuf,
    /// Source mtime in milliseconds at indexing time; the staleness oracle.
    pub mtime: i64,
    pub chunks: Vec<IndexedChunk>,
}

/// Persisted root: the whole semantic index for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingIndex {
    pub version: u32,
    pub docs: Vec<IndexedDocument>,
}

impl EmbeddingIndex {
    pub fn new(docs: Vec<IndexedDocument>) -> Self {
        Self {
            version: INDEX_VERSION,
            docs,
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.docs.iter().map(|d| d.chunks.len()).sum()
    }
}

/// Owns the persisted index file for one project root.
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn for_project(root: &Path) -> Self {
        Self {
            path: root.join(INDEX_DIR).join(INDEX_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted index. Missing, unparsable, or version-mismatched
    /// files all read as `None` — corruption degrades to a rebuild, never
    /// an error.
    pub fn load(&self) -> Option<EmbeddingIndex> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let index: EmbeddingIndex = serde_json::from_str(&raw).ok()?;
        if index.version != INDEX_VERSION {
            return None;
        }
        Some(index)
    }

    /// Serialize and replace the persisted index atomically: write to a
    /// temp file in the same directory, then rename over the target.
    pub fn save(&self, index: &EmbeddingIndex) -> Result<()> {
        let dir = self
            .path
            .parent()
            .context("index path has no parent directory")?;
        fs::create_dir_all(dir)?;

        let tmp = self.path.with_extension("json.tmp");
        let raw = serde_json::to_string(index)?;
        fs::write(&tmp, raw)
            .with_context(|| format!("failed to write index to {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace index at {}", self.path.display()))?;
        Ok(())
    }

    /// Remove the persisted index. No-op when absent.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Whole-index staleness check: true if any indexed document's source
    /// file is gone or its mtime differs from the recorded one.
    pub fn is_stale(&self, index: &EmbeddingIndex) -> bool {
        index.docs.iter().any(|doc| {
            match mtime_millis(&doc.path) {
                Ok(current) => current != doc.mtime,
                Err(_) => true,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_doc(path: PathBuf, mtime: i64) -> IndexedDocument {
        IndexedDocument {
            doc_type: DocType::Api,
            slug: "orders.md".to_string(),
            path,
            mtime,
            chunks: vec![IndexedChunk {
                text: "Orders API".to_string(),
                start: 0,
                end: 10,
                embedding: vec![0.6, 0.8],
            }],
        }
    }

    #[test]
    fn test_load_missing_returns_none() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::for_project(tmp.path());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::for_project(tmp.path());

        let index = EmbeddingIndex::new(vec![sample_doc(tmp.path().join("orders.md"), 42)]);
        store.save(&index).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.version, INDEX_VERSION);
        assert_eq!(loaded.docs.len(), 1);
        assert_eq!(loaded.docs[0].slug, "orders.md");
        assert_eq!(loaded.docs[0].mtime, 42);
        assert_eq!(loaded.docs[0].chunks[0].embedding, vec![0.6, 0.8]);
        assert_eq!(loaded.chunk_count(), 1);

        // No temp file left behind after a successful save.
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_persisted_field_names_are_camel_case() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::for_project(tmp.path());
        store
            .save(&EmbeddingIndex::new(vec![sample_doc(
                tmp.path().join("orders.md"),
                1,
            )]))
            .unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"docType\":\"api\""));
        assert!(raw.contains("\"version\":1"));
    }

    #[test]
    fn test_load_rejects_version_mismatch() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::for_project(tmp.path());

        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"version":99,"docs":[]}"#).unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_tolerates_corrupt_file() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::for_project(tmp.path());

        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ this is not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::for_project(tmp.path());

        store.delete().unwrap();

        store.save(&EmbeddingIndex::new(vec![])).unwrap();
        assert!(store.load().is_some());
        store.delete().unwrap();
        assert!(store.load().is_none());
        store.delete().unwrap();
    }

    #[test]
    fn test_stale_when_source_missing() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::for_project(tmp.path());

        let index = EmbeddingIndex::new(vec![sample_doc(tmp.path().join("gone.md"), 42)]);
        assert!(store.is_stale(&index));
    }

    #[test]
    fn test_stale_tracks_mtime_exactly() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::for_project(tmp.path());

        let doc_path = tmp.path().join("orders.md");
        fs::write(&doc_path, "Orders API").unwrap();
        let actual = mtime_millis(&doc_path).unwrap();

        // Recorded mtime matches the file: fresh.
        let fresh = EmbeddingIndex::new(vec![sample_doc(doc_path.clone(), actual)]);
        assert!(!store.is_stale(&fresh));

        // Any difference in either direction: stale.
        let behind = EmbeddingIndex::new(vec![sample_doc(doc_path.clone(), actual - 1)]);
        let ahead = EmbeddingIndex::new(vec![sample_doc(doc_path, actual + 1)]);
        assert!(store.is_stale(&behind));
        assert!(store.is_stale(&ahead));
    }

    #[test]
    fn test_empty_index_is_never_stale() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::for_project(tmp.path());
        assert!(!store.is_stale(&EmbeddingIndex::new(vec![])));
    }
}
