//! Search command - case-insensitive substring scan over document content

use anyhow::Result;
use colored::*;
use regex::RegexBuilder;

use crate::core::document::Document;
use crate::core::paths::{list_doc_files, project_root, DocType};

const CONTEXT_CHARS: usize = 40;

pub fn run(query: &str, doc_type: Option<DocType>, limit: Option<usize>) -> Result<()> {
    let root = project_root()?;
    let items = list_doc_files(&root, doc_type);

    let re = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()?;

    let mut matches = Vec::new();
    for item in &items {
        let doc = match Document::load(item) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Skipping {}/{}: {}", item.doc_type, item.slug, e);
                continue;
            }
        };
        if let Some(mat) = re.find(&doc.content) {
            let snippet = extract_context(&doc.content, mat.start(), mat.end());
            matches.push((item.doc_type, item.slug.clone(), snippet));
        }
    }

    let total = matches.len();
    let display_limit = limit.unwrap_or(20);
    let shown = &matches[..matches.len().min(display_limit)];

    println!("{}", "Search Results".bold());
    println!("{}", "=".repeat(60));
    println!("Query: \"{}\"", query);
    println!("Found: {} matches", total);
    println!();

    if shown.is_empty() {
        println!("{}", "No matches found.".yellow());
    } else {
        for (doc_type, slug, snippet) in shown {
            println!("{} / {}", doc_type.to_string().bold(), slug.cyan());
            println!("  {}", snippet.replace('\n', " ").dimmed());
            println!();
        }
        if total > display_limit {
            println!(
                "{}",
                format!("... and {} more results", total - display_limit).dimmed()
            );
        }
    }

    Ok(())
}

/// Slice around a byte-range match, widened by `CONTEXT_CHARS` characters
/// on each side, with ellipses where content was cut.
pub(crate) fn extract_context(content: &str, match_start: usize, match_end: usize) -> String {
    let chars: Vec<char> = content.chars().collect();
    let char_of_byte: std::collections::HashMap<usize, usize> = content
        .char_indices()
        .enumerate()
        .map(|(i, (byte_idx, _))| (byte_idx, i))
        .collect();

    let char_start = char_of_byte.get(&match_start).copied().unwrap_or(0);
    let char_end = char_of_byte.get(&match_end).copied().unwrap_or(chars.len());

    let start = char_start.saturating_sub(CONTEXT_CHARS);
    let end = (char_end + CONTEXT_CHARS).min(chars.len());

    let body: String = chars[start..end].iter().collect();
    let prefix = if start > 0 { "…" } else { "" };
    let suffix = if end < chars.len() { "…" } else { "" };
    format!("{}{}{}", prefix, body.trim(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_context_short_content() {
        let out = extract_context("hello world", 0, 5);
        assert_eq!(out, "hello world");
    }

    #[test]
    fn test_extract_context_adds_ellipses() {
        let content = format!("{}needle{}", "a".repeat(100), "b".repeat(100));
        let out = extract_context(&content, 100, 106);
        assert!(out.starts_with('…'));
        assert!(out.ends_with('…'));
        assert!(out.contains("needle"));
    }
}
