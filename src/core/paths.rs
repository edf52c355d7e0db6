//! Document tree layout: typed folders under `docs/` and path resolution.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    static ref MD_EXT_RE: Regex = Regex::new(r"(?i)\.md$").unwrap();
}

/// Folder name holding all documentation, relative to the project root.
pub const DOCS_DIR: &str = "docs";

/// Well-known product vision document, directly under `docs/`.
pub const PRODUCT_VISION_FILENAME: &str = "product-vision-and-strategy.md";

/// Env var overriding the project root (defaults to the current directory).
pub const PROJECT_ROOT_ENV: &str = "DOCS_PROJECT_ROOT";

/// Document categories, each mapping to a folder under `docs/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum DocType {
    FeatureSpecs,
    Jtbd,
    UserStories,
    Api,
}

impl DocType {
    pub const ALL: [DocType; 4] = [
        DocType::FeatureSpecs,
        DocType::Jtbd,
        DocType::UserStories,
        DocType::Api,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::FeatureSpecs => "feature-specs",
            DocType::Jtbd => "jtbd",
            DocType::UserStories => "user-stories",
            DocType::Api => "api",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = DocPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DocPathError::UnknownDocType(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DocPathError {
    #[error("invalid document path: path traversal not allowed")]
    Traversal,
    #[error("unknown doc type '{0}' (expected feature-specs, jtbd, user-stories, or api)")]
    UnknownDocType(String),
    #[error("project root does not exist: {0}")]
    MissingRoot(String),
}

/// A listed document: its category, filename, and absolute path.
#[derive(Debug, Clone, PartialEq)]
pub struct DocFile {
    pub doc_type: DocType,
    pub slug: String,
    pub path: PathBuf,
}

/// Resolve the project root from `DOCS_PROJECT_ROOT` or the current directory.
pub fn project_root() -> Result<PathBuf> {
    let root = match std::env::var(PROJECT_ROOT_ENV) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v),
        _ => std::env::current_dir()?,
    };
    if !root.exists() {
        return Err(DocPathError::MissingRoot(root.display().to_string()).into());
    }
    Ok(root)
}

/// Folder for a doc type, created if missing.
pub fn doc_type_dir(root: &Path, doc_type: DocType) -> Result<PathBuf> {
    let dir = root.join(DOCS_DIR).join(doc_type.as_str());
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Resolve the full path for a document, normalizing the slug.
///
/// The slug is stripped of any `.md` suffix (case-insensitive), defaulted to
/// `untitled` if empty, and given a `.md` extension. Slugs that would escape
/// the doc type folder are rejected.
pub fn doc_path(root: &Path, doc_type: DocType, slug: &str) -> Result<PathBuf> {
    let base = MD_EXT_RE.replace(slug.trim(), "");
    let base: &str = if base.is_empty() { "untitled" } else { &base };
    let filename = format!("{}.md", base);

    let dir = doc_type_dir(root, doc_type)?;
    let full = dir.join(&filename);

    // A slug containing separators or ".." could point outside the folder.
    match full.strip_prefix(&dir) {
        Ok(rel) if rel.components().count() == 1 && !filename.contains("..") => Ok(full),
        _ => Err(DocPathError::Traversal.into()),
    }
}

/// Path to the product vision document; `docs/` is created if missing.
pub fn product_vision_path(root: &Path) -> Result<PathBuf> {
    let dir = root.join(DOCS_DIR);
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir.join(PRODUCT_VISION_FILENAME))
}

/// List all `.md` files for one doc type, or for every type when `None`.
///
/// Missing folders are skipped. Entries are sorted by filename within each
/// type so enumeration order is deterministic.
pub fn list_doc_files(root: &Path, doc_type: Option<DocType>) -> Vec<DocFile> {
    let types: Vec<DocType> = match doc_type {
        Some(t) => vec![t],
        None => DocType::ALL.to_vec(),
    };

    let mut results = Vec::new();
    for t in types {
        let dir = root.join(DOCS_DIR).join(t.as_str());
        if !dir.exists() {
            continue;
        }
        let mut entries: Vec<DocFile> = Vec::new();
        if let Ok(read) = fs::read_dir(&dir) {
            for entry in read.flatten() {
                let path = entry.path();
                let is_md = path
                    .extension()
                    .map(|e| e.eq_ignore_ascii_case("md"))
                    .unwrap_or(false);
                if path.is_file() && is_md {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        entries.push(DocFile {
                            doc_type: t,
                            slug: name.to_string(),
                            path: path.clone(),
                        });
                    }
                }
            }
        }
        entries.sort_by(|a, b| a.slug.cmp(&b.slug));
        results.extend(entries);
    }

    results
}
