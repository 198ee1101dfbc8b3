//! Top Issue Selector
//!
//! Ranks a backlog document by priority, impact and estimate and writes the
//! top N issues to a new document.
//!
//! ## Usage
//! ```bash
//! # Top 10 (default)
//! select-top-issues backlog/issues.yaml backlog/top10.yaml
//!
//! # Top 5 as JSON
//! select-top-issues backlog/issues.yaml top5.json --limit 5 --format json
//!
//! # With environment variables
//! TOP_ISSUES_LIMIT=20 select-top-issues backlog/issues.yaml top20.yaml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use issue_ranker::{document, OutputFormat, DEFAULT_KEY};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Top Issue Selector
#[derive(Parser, Debug)]
#[command(name = "select-top-issues")]
#[command(about = "Select the top issues from a backlog by priority, impact and estimate")]
#[command(version)]
struct Args {
    /// Input backlog document (YAML or JSON)
    input: PathBuf,

    /// Output document path
    output: PathBuf,

    /// Number of issues to keep
    #[arg(long, short = 'n', env = "TOP_ISSUES_LIMIT", default_value_t = 10)]
    limit: usize,

    /// Top-level key holding the issue sequence
    #[arg(long, default_value = DEFAULT_KEY)]
    key: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        input = %args.input.display(),
        limit = args.limit,
        "Ranking backlog"
    );
    let written =
        document::select_top_issues(&args.input, &args.output, &args.key, args.limit, args.format)
            .with_context(|| format!("Failed to select top issues from {}", args.input.display()))?;
    info!(issues = written, "Selected top issues");

    println!("Top issues written to {}", args.output.display());
    Ok(())
}
