//! Semantic Search command - embedding-based document search

use anyhow::Result;
use colored::*;

use crate::core::config::SearchConfig;
use crate::core::paths::{project_root, DocType};
use crate::search::engine::{SearchEngine, DEFAULT_SEARCH_LIMIT};

pub fn run(query: &str, doc_type: Option<DocType>, limit: Option<usize>, json: bool) -> Result<()> {
    let root = project_root()?;
    let config = SearchConfig::from_env();
    let engine = SearchEngine::new(&root, &config);
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    if !engine.is_enabled() {
        if json {
            println!("[]");
        } else {
            println!(
                "{} Semantic search is disabled. Set {} to enable it.",
                "!".yellow(),
                "DOCS_EMBEDDING_PROVIDER=local".cyan()
            );
        }
        return Ok(());
    }

    let results = engine.search(query, doc_type, limit)?;

    if json {
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
        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{} No results found for: {}", "→".dimmed(), query.cyan());
        return Ok(());
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        results.len(),
        query.cyan()
    );
    println!();

    for (i, result) in results.iter().enumerate() {
        let score_str = format!("{:.2}", result.score);
        let score_colored = if result.score > 0.8 {
            score_str.green()
        } else if result.score > 0.6 {
            score_str.yellow()
        } else {
            score_str.dimmed()
        };

        println!(
            "{}. [{}] {} / {}",
            (i + 1).to_string().bold(),
            score_colored,
            result.doc_type,
            result.slug.cyan()
        );

        // Snippets are pre-truncated; keep them on one line for display.
        println!("   {}", result.snippet.replace('\n', " ").dimmed());
        println!();
    }

    Ok(())
}
