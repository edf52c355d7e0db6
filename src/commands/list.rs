//! List command - enumerate documentation files

use anyhow::Result;
use colored::*;

use crate::core::paths::{list_doc_files, project_root, DocType};

pub fn run(doc_type: Option<DocType>, json: bool) -> Result<()> {
    let root = project_root()?;
    let items = list_doc_files(&root, doc_type);

    if json {
        let json_items: Vec<_> = items
            .iter()
            .map(|i| {
                serde_json::json!({
                    "docType": i.doc_type.as_str(),
                    "slug": i.slug,
                    "path": i.path.display().to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if items.is_empty() {
        match doc_type {
            Some(t) => println!("{} No markdown files found in {}.", "!".yellow(), t),
            None => println!(
                "{} No documentation files found. Create some under docs/.",
                "!".yellow()
            ),
        }
        return Ok(());
    }

    println!(
        "{} {} documentation files",
        "→".dimmed(),
        items.len().to_string().cyan()
    );
    println!();
    for item in &items {
        println!("  {} / {}", item.doc_type.to_string().bold(), item.slug);
    }

    Ok(())
}
