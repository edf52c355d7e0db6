//! Loading documents from disk with their modification timestamps.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::paths::{DocFile, DocType};

/// A document read from disk: content plus the mtime observed at read time.
pub struct Document {
    pub doc_type: DocType,
    pub slug: String,
    pub path: PathBuf,
    pub content: String,
    /// Modification time in milliseconds since the epoch.
    pub mtime: i64,
}

impl Document {
    pub fn load(file: &DocFile) -> Result<Self> {
        let content = fs::read_to_string(&file.path)?;
        let mtime = mtime_millis(&file.path)?;

        Ok(Self {
            doc_type: file.doc_type,
            slug: file.slug.clone(),
            path: file.path.clone(),
            content,
            mtime,
        })
    }
}

/// Current modification time of a file, in milliseconds since the epoch.
pub fn mtime_millis(path: &Path) -> Result<i64> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Utc>::from(modified).timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("spec.md");
        fs::write(&path, "# Spec\n\nBody text.").unwrap();

        let file = DocFile {
            doc_type: DocType::FeatureSpecs,
            slug: "spec.md".to_string(),
            path: path.clone(),
        };
        let doc = Document::load(&file).unwrap();

        assert_eq!(doc.content, "# Spec\n\nBody text.");
        assert_eq!(doc.mtime, mtime_millis(&path).unwrap());
        assert!(doc.mtime > 0);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let file = DocFile {
            doc_type: DocType::Api,
            slug: "gone.md".to_string(),
            path: tmp.path().join("gone.md"),
        };
        assert!(Document::load(&file).is_err());
    }
}
