mod commands;
mod core;
#[cfg(feature = "mcp")]
mod mcp;
mod search;

use clap::{Parser, Subcommand};

use crate::core::paths::DocType;

#[derive(Parser)]
#[command(name = "docstore")]
#[command(about = "Documentation store CLI with semantic search", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check or create the docs/ folder layout
    Init {
        #[arg(long, help = "Create missing folders")]
        create: bool,
    },
    /// List documentation files
    List {
        #[arg(long = "type", value_enum, help = "Filter by document type")]
        doc_type: Option<DocType>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Substring search over document content
    Search {
        query: String,
        #[arg(long = "type", value_enum, help = "Limit to a document type")]
        doc_type: Option<DocType>,
        #[arg(long, short, help = "Limit results")]
        limit: Option<usize>,
    },
    /// Semantic search using vector embeddings
    #[command(name = "semantic-search", alias = "ss")]
    SemanticSearch {
        query: String,
        #[arg(long = "type", value_enum, help = "Limit to a document type")]
        doc_type: Option<DocType>,
        #[arg(long, short, help = "Limit results")]
        limit: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Build or inspect the semantic search index
    Index {
        #[arg(long, help = "Show index status only")]
        status: bool,
        #[arg(long, help = "Force rebuild index")]
        rebuild: bool,
        #[arg(long, help = "Delete the index")]
        clear: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Start MCP server for client integration
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, help = "Show client configuration instructions")]
        install: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { create } => commands::init::run(create),
        Commands::List { doc_type, json } => commands::list::run(doc_type, json),
        Commands::Search {
            query,
            doc_type,
            limit,
        } => commands::search::run(&query, doc_type, limit),
        Commands::SemanticSearch {
            query,
            doc_type,
            limit,
            json,
        } => commands::semantic_search::run(&query, doc_type, limit, json),
        Commands::Index {
            status,
            rebuild,
            clear,
            json,
        } => commands::index::run(status, rebuild, clear, json),

        #[cfg(feature = "mcp")]
        Commands::Mcp { install } => {
            if install {
                print_mcp_install_instructions();
                Ok(())
            } else {
                run_mcp_server()
            }
        }
    }
}

#[cfg(feature = "mcp")]
fn run_mcp_server() -> anyhow::Result<()> {
    let root = crate::core::paths::project_root()?;
    let config = crate::core::config::SearchConfig::from_env();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(mcp::run_mcp_server(root, config))
}

#[cfg(feature = "mcp")]
fn print_mcp_install_instructions() {
    use colored::Colorize;

    let root = std::env::current_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "/path/to/your/project".to_string());

    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "docstore".to_string());

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your client configuration:");
    println!();
    println!(
        "{}",
        "For Claude Desktop (~/.config/claude/claude_desktop_config.json):".dimmed()
    );
    println!(
        r#"{{
  "mcpServers": {{
    "docstore": {{
      "command": "{}",
      "args": ["mcp"],
      "env": {{ "DOCS_PROJECT_ROOT": "{}" }}
    }}
  }}
}}"#,
        binary_path, root
    );
    println!();
    println!(
        "Set {} to enable semantic search.",
        "DOCS_EMBEDDING_PROVIDER=local".cyan()
    );
    println!();
    println!("{}", "Available tools:".bold());
    println!("  • {} - List documents by type", "list_docs".green());
    println!("  • {} - Read a document", "read_doc".green());
    println!("  • {} - Write or overwrite a document", "write_doc".green());
    println!("  • {} - Create a new document", "create_doc".green());
    println!("  • {} - Delete a document", "delete_doc".green());
    println!("  • {} - Substring search", "search_docs".green());
    println!("  • {} - Embedding-based search", "semantic_search".green());
    println!(
        "  • {} - Product vision document",
        "product_vision_and_strategy".green()
    );
}
