//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod crawl;
mod extract;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use crawl::CrawlArgs;

#[derive(Parser)]
#[command(name = "jobacquire")]
#[command(about = "Remote job listing crawler")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl listing pages and write job records as JSON lines
    Crawl(CrawlArgs),

    /// Run field extraction on a saved job page
    Extract {
        /// HTML file of a job detail page
        file: PathBuf,
        /// URL the page was fetched from
        #[arg(long)]
        url: String,
        /// Category to record when the page names none
        #[arg(long)]
        category: Option<String>,
    },

    /// Parse a salary string
    Salary {
        /// Salary text, e.g. "$80,000 - $100,000 per year"
        text: String,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl(args) => crawl::cmd_crawl(args).await,
        Commands::Extract {
            file,
            url,
            category,
        } => extract::cmd_extract(&file, &url, category.as_deref()),
        Commands::Salary { text } => extract::cmd_salary(&text),
    }
}
