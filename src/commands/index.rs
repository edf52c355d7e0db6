//! Index command - build and inspect the semantic search index

use anyhow::Result;
use colored::*;

use crate::core::config::SearchConfig;
use crate::core::paths::project_root;
use crate::search::engine::{IndexState, SearchEngine};

pub fn run(status_only: bool, rebuild: bool, clear: bool, json: bool) -> Result<()> {
    let root = project_root()?;
    let config = SearchConfig::from_env();
    let engine = SearchEngine::new(&root, &config);

    if status_only {
        return show_status(&engine, json);
    }

    if clear {
        engine.store().delete()?;
        if json {
            println!("{}", serde_json::json!({ "cleared": true }));
        } else {
            println!("{} Removed semantic search index", "✓".green().bold());
        }
        return Ok(());
    }

    if !json {
        println!("{} Building search index...", "→".dimmed());
    }

    let state = if rebuild {
        engine.rebuild_index()?
    } else {
        engine.ensure_index()?
    };

    match state {
        IndexState::Disabled => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "error": "Semantic search is disabled",
                        "hint": "Set DOCS_EMBEDDING_PROVIDER=local"
                    })
                );
            } else {
                eprintln!(
                    "{} Semantic search is disabled. Set {} first.",
                    "Error:".red().bold(),
                    "DOCS_EMBEDDING_PROVIDER=local".cyan()
                );
            }
            std::process::exit(1);
        }
        IndexState::Fresh => {
            if json {
                println!("{}", serde_json::json!({ "built": false, "fresh": true }));
            } else {
                println!("{} Index is already up to date", "✓".green().bold());
            }
        }
        IndexState::Built(stats) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "built": true,
                        "documents": stats.documents,
                        "chunks": stats.chunks,
                        "skipped": stats.skipped,
                        "duration_ms": stats.duration_ms,
                    })
                );
            } else {
                println!();
                println!(
                    "{} Indexed {} documents ({} chunks) in {:.2}s",
                    "✓".green().bold(),
                    stats.documents.to_string().cyan(),
                    stats.chunks,
                    stats.duration_ms as f64 / 1000.0
                );
                if stats.skipped > 0 {
                    println!("  {} {} documents skipped", "✗".red(), stats.skipped);
                }
                println!(
                    "  {} Index saved to: {}",
                    "→".dimmed(),
                    engine.store().path().display()
                );
            }
        }
    }

    Ok(())
}

fn show_status(engine: &SearchEngine, json: bool) -> Result<()> {
    let index = match engine.store().load() {
        Some(i) => i,
        None => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "exists": false, "error": "Index not found" })
                );
            } else {
                println!(
                    "{} Index not found. Run {} first.",
                    "!".yellow().bold(),
                    "docstore index".cyan()
                );
            }
            return Ok(());
        }
    };

    let stale = engine.store().is_stale(&index);
    let file_size = std::fs::metadata(engine.store().path())
        .map(|m| m.len())
        .unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "exists": true,
                "stale": stale,
                "documents": index.docs.len(),
                "chunks": index.chunk_count(),
                "file_size_bytes": file_size,
            })
        );
    } else {
        println!("{}", "Index Status".bold());
        println!();
        println!(
            "  {} {} documents indexed",
            "→".dimmed(),
            index.docs.len().to_string().cyan()
        );
        println!(
            "  {} {} chunks",
            "→".dimmed(),
            index.chunk_count().to_string().cyan()
        );
        println!(
            "  {} Size: {:.2} KB",
            "→".dimmed(),
            file_size as f64 / 1024.0
        );
        if stale {
            println!(
                "  {} Index is stale and will rebuild on the next search",
                "!".yellow()
            );
        }
        if let Ok(meta) = std::fs::metadata(engine.store().path()) {
            if let Ok(modified) = meta.modified() {
                let dt = chrono::DateTime::<chrono::Local>::from(modified);
                println!(
                    "  {} Last built: {}",
                    "→".dimmed(),
                    dt.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
    }

    Ok(())
}
