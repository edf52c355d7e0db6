//! Init command - check or create the documentation folder layout

use anyhow::Result;
use colored::*;
use std::fs;

use crate::core::paths::{project_root, DocType, DOCS_DIR};

pub fn run(create: bool) -> Result<()> {
    let root = project_root()?;

    println!("{}", "Documentation Store Structure".bold());
    println!("{}", "=".repeat(50));
    println!();

    let mut missing = 0;
    let mut created = 0;

    let docs = root.join(DOCS_DIR);
    let mut folders = vec![(docs.clone(), "All documentation".to_string())];
    for t in DocType::ALL {
        folders.push((docs.join(t.as_str()), format!("{} documents", t)));
    }

    for (path, purpose) in &folders {
        if path.exists() {
            println!("{} {} exists ({})", "✓".green(), path.display(), purpose);
        } else if create {
            fs::create_dir_all(path)?;
            created += 1;
            println!("{} Created {} ({})", "✓".green(), path.display(), purpose);
        } else {
            missing += 1;
            println!("{} {} missing ({})", "✗".red(), path.display(), purpose);
        }
    }

    println!();
    println!("{}", "Summary".bold());
    println!("{}", "=".repeat(50));

    if create {
        println!("Created: {} folders", created.to_string().green());
        Ok(())
    } else if missing > 0 {
        println!("Missing: {} folders", missing.to_string().red());
        println!();
        println!("{}", "Run with --create to create missing folders.".yellow());
        std::process::exit(1);
    } else {
        println!("Missing: {} folders", "0".green());
        println!();
        println!("{}", "✓ Documentation structure is valid!".green());
        Ok(())
    }
}
