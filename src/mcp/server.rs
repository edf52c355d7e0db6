//! Documentation store MCP server implementation

use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::commands::search::extract_context;
use crate::core::config::SearchConfig;
use crate::core::document::Document;
use crate::core::paths::{doc_path, list_doc_files, product_vision_path, DocType};
use crate::search::engine::{invalidate_index, SearchEngine, DEFAULT_SEARCH_LIMIT};

const VISION_TEMPLATE: &str = "# Product Vision and Strategy

## Vision
<!-- Describe the product vision: what problem we solve, for whom, and the desired long-term impact -->

## Strategy
<!-- Describe the product strategy: how we get there, key initiatives, and success criteria -->
";

/// Parameters for list_docs tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListDocsParams {
    /// Filter by document type; omit to list all types
    #[schemars(description = "Filter by document type. Omit to list all types.")]
    #[serde(default)]
    pub doc_type: Option<DocType>,
}

/// Parameters for read_doc / delete_doc tools
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DocRefParams {
    #[schemars(description = "Document type")]
    pub doc_type: DocType,
    /// Filename or slug (e.g. my-feature.md or my-feature)
    #[schemars(description = "Filename or slug (e.g. my-feature.md or my-feature)")]
    pub slug: String,
}

/// Parameters for write_doc tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteDocParams {
    #[schemars(description = "Document type")]
    pub doc_type: DocType,
    #[schemars(description = "Filename or slug (e.g. my-feature.md)")]
    pub slug: String,
    #[schemars(description = "Markdown content to write")]
    pub content: String,
}

/// Parameters for create_doc tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateDocParams {
    #[schemars(description = "Document type")]
    pub doc_type: DocType,
    #[schemars(description = "Filename or slug (e.g. my-feature.md)")]
    pub slug: String,
    #[schemars(description = "Initial markdown content (optional)")]
    #[serde(default)]
    pub content: Option<String>,
}

/// Parameters for search_docs tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchDocsParams {
    #[schemars(description = "Text to search for in document content")]
    pub query: String,
    #[schemars(description = "Limit search to this doc type")]
    #[serde(default)]
    pub doc_type: Option<DocType>,
}

/// Parameters for semantic_search tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SemanticSearchParams {
    /// Natural language search query
    #[schemars(description = "Natural language search query")]
    pub query: String,
    #[schemars(description = "Limit search to this doc type")]
    #[serde(default)]
    pub doc_type: Option<DocType>,
    /// Maximum number of results (default: 10)
    #[schemars(description = "Maximum number of results (default: 10)")]
    #[serde(default)]
    pub limit: usize,
}

/// Documentation store MCP service
#[derive(Clone)]
pub struct DocService {
    root: PathBuf,
    config: SearchConfig,
    tool_router: ToolRouter<Self>,
}

impl DocService {
    pub fn new(root: PathBuf, config: SearchConfig) -> Self {
        Self {
            root,
            config,
            tool_router: Self::tool_router(),
        }
    }

    fn resolve_path(&self, doc_type: DocType, slug: &str) -> Result<PathBuf, McpError> {
        doc_path(&self.root, doc_type, slug)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))
    }

    fn invalidate(&self) -> Result<(), McpError> {
        invalidate_index(&self.root)
            .map_err(|e| McpError::internal_error(format!("Failed to invalidate index: {}", e), None))
    }
}

fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

#[tool_router]
impl DocService {
    /// List documentation files
    #[tool(description = "List documentation files. Optionally filter by doc type (feature-specs, jtbd, user-stories, api).")]
    async fn list_docs(
        &self,
        params: Parameters<ListDocsParams>,
    ) -> Result<CallToolResult, McpError> {
        let items = list_doc_files(&self.root, params.0.doc_type);
        if items.is_empty() {
            return Ok(text_result(match params.0.doc_type {
                Some(t) => format!("No markdown files found in {}.", t),
                None => "No markdown documentation files found. Create some with create_doc.".to_string(),
            }));
        }

        let lines: Vec<String> = items
            .iter()
            .map(|i| format!("- **{}** / {}", i.doc_type, i.slug))
            .collect();
        Ok(text_result(format!(
            "Documentation files ({}):\n\n{}",
            items.len(),
            lines.join("\n")
        )))
    }

    /// Read a document's content
    #[tool(description = "Read the content of a documentation file by type and slug (filename without path).")]
    async fn read_doc(
        &self,
        params: Parameters<DocRefParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.resolve_path(params.0.doc_type, &params.0.slug)?;
        if !path.exists() {
            return Ok(text_result(format!(
                "File not found: {}/{}",
                params.0.doc_type, params.0.slug
            )));
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| McpError::internal_error(format!("Failed to read document: {}", e), None))?;
        Ok(text_result(content))
    }

    /// Write or overwrite a document
    #[tool(description = "Write or overwrite a documentation file. Content must be markdown. Creates parent folder if needed.")]
    async fn write_doc(
        &self,
        params: Parameters<WriteDocParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.resolve_path(params.0.doc_type, &params.0.slug)?;
        fs::write(&path, &params.0.content)
            .map_err(|e| McpError::internal_error(format!("Failed to write document: {}", e), None))?;
        self.invalidate()?;

        let name = path.file_name().map(|n| n.to_string_lossy().to_string());
        Ok(text_result(format!(
            "Wrote {}/{}",
            params.0.doc_type,
            name.unwrap_or(params.0.slug)
        )))
    }

    /// Create a new document
    #[tool(description = "Create a new documentation file with optional initial content. Use doc_type to choose category.")]
    async fn create_doc(
        &self,
        params: Parameters<CreateDocParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.resolve_path(params.0.doc_type, &params.0.slug)?;
        if path.exists() {
            return Ok(text_result(format!(
                "File already exists: {}/{}. Use write_doc to overwrite.",
                params.0.doc_type, params.0.slug
            )));
        }
        fs::write(&path, params.0.content.as_deref().unwrap_or(""))
            .map_err(|e| McpError::internal_error(format!("Failed to create document: {}", e), None))?;
        self.invalidate()?;

        let name = path.file_name().map(|n| n.to_string_lossy().to_string());
        Ok(text_result(format!(
            "Created {}/{}",
            params.0.doc_type,
            name.unwrap_or(params.0.slug)
        )))
    }

    /// Delete a document
    #[tool(description = "Delete a documentation file by type and slug.")]
    async fn delete_doc(
        &self,
        params: Parameters<DocRefParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.resolve_path(params.0.doc_type, &params.0.slug)?;
        if !path.exists() {
            return Ok(text_result(format!(
                "File not found: {}/{}",
                params.0.doc_type, params.0.slug
            )));
        }
        fs::remove_file(&path)
            .map_err(|e| McpError::internal_error(format!("Failed to delete document: {}", e), None))?;
        self.invalidate()?;

        Ok(text_result(format!(
            "Deleted {}/{}",
            params.0.doc_type, params.0.slug
        )))
    }

    /// Substring search across documents
    #[tool(description = "Search documentation by text (case-insensitive). Optionally limit to a doc type.")]
    async fn search_docs(
        &self,
        params: Parameters<SearchDocsParams>,
    ) -> Result<CallToolResult, McpError> {
        let re = regex::RegexBuilder::new(&regex::escape(&params.0.query))
            .case_insensitive(true)
            .build()
            .map_err(|e| McpError::internal_error(format!("Bad query: {}", e), None))?;

        let items = list_doc_files(&self.root, params.0.doc_type);
        let mut matches = Vec::new();
        for item in &items {
            let doc = match Document::load(item) {
                Ok(d) => d,
                Err(_) => continue,
            };
            if let Some(mat) = re.find(&doc.content) {
                let snippet = extract_context(&doc.content, mat.start(), mat.end());
                matches.push((item.doc_type, item.slug.clone(), snippet));
            }
        }

        if matches.is_empty() {
            return Ok(text_result(format!(
                "No documents containing \"{}\" found.",
                params.0.query
            )));
        }
        let lines: Vec<String> = matches
            .iter()
            .map(|(t, slug, snippet)| format!("- **{}** / {}\n  {}", t, slug, snippet.trim()))
            .collect();
        Ok(text_result(format!(
            "Found {} match(es):\n\n{}",
            matches.len(),
            lines.join("\n\n")
        )))
    }

    /// Semantic search over document chunks
    #[tool(description = "Search documentation by meaning using vector embeddings. Returns ranked chunks with similarity scores. Empty result when semantic search is not configured.")]
    async fn semantic_search(
        &self,
        params: Parameters<SemanticSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        // Clamp limit: default 10, max 100
        let limit = if params.0.limit == 0 {
            DEFAULT_SEARCH_LIMIT
        } else {
            params.0.limit.min(100)
        };

        let engine = SearchEngine::new(&self.root, &self.config);
        let results = engine
            .search(&params.0.query, params.0.doc_type, limit)
            .map_err(|e| McpError::internal_error(format!("Search failed: {}", e), None))?;

        let json_results: Vec<_> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "docType": r.doc_type.as_str(),
                    "slug": r.slug,
                    "score": r.score,
                    "snippet": r.snippet,
                })
            })
            .collect();

        let output = serde_json::to_string_pretty(&json_results).map_err(|e| {
            McpError::internal_error(format!("JSON serialization failed: {}", e), None)
        })?;
        Ok(text_result(output))
    }

    /// Product vision and strategy document
    #[tool(description = "View the product vision and strategy document. Creates the file with a default template (docs/product-vision-and-strategy.md) if it does not exist.")]
    async fn product_vision_and_strategy(&self) -> Result<CallToolResult, McpError> {
        let path = product_vision_path(&self.root)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        if !path.exists() {
            fs::write(&path, VISION_TEMPLATE).map_err(|e| {
                McpError::internal_error(format!("Failed to create document: {}", e), None)
            })?;
            return Ok(text_result(format!(
                "Created docs/product-vision-and-strategy.md. Content:\n\n{}",
                VISION_TEMPLATE
            )));
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| McpError::internal_error(format!("Failed to read document: {}", e), None))?;
        Ok(text_result(content))
    }
}

impl ServerHandler for DocService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Documentation store MCP server. Provides typed markdown documents (feature-specs, jtbd, user-stories, api) with substring and semantic search.".to_string()
            ),
            ..Default::default()
        }
    }
}

/// Run the MCP server on stdio
pub async fn run_mcp_server(root: PathBuf, config: SearchConfig) -> Result<()> {
    use tokio::io::{stdin, stdout};

    let service = DocService::new(root, config);
    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
