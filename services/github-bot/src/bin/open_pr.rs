//! GitHub Pull Request Automation Tool
//!
//! Commits a list of local files to a work branch, opens a pull request,
//! ticks the checklist of the linked issue and requests review.
//!
//! ## Usage
//! ```bash
//! open-pr \
//!   --repo acme/web \
//!   --branch feature/WEB-01-auth \
//!   --files-from web-01.files \
//!   --title "WEB-01: Web authentication and session" \
//!   --issue WEB-01 \
//!   --reviewers octocat
//!
//! # With environment variables
//! GITHUB_REPOSITORY=acme/web \
//! GH_TOKEN=<TOKEN> \
//! GH_BRANCH=feature/WEB-01-auth \
//! open-pr --files apps/web/middleware.ts,apps/web/package.json --title "WEB-01"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use github_bot::client::{GitHubClient, GITHUB_API};
use github_bot::pr::{self, PullRequestPlan};
use std::fs;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// GitHub Pull Request Automation Tool
#[derive(Parser, Debug)]
#[command(name = "open-pr")]
#[command(about = "Commit files to a branch and open a GitHub pull request")]
#[command(version)]
struct Args {
    /// Repository in format owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: String,

    /// GitHub token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API root
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API)]
    api_url: String,

    /// Work branch to commit to
    #[arg(long, env = "GH_BRANCH")]
    branch: String,

    /// Base branch
    #[arg(long, env = "GH_BASE", default_value = "main")]
    base: String,

    /// Files to commit (comma-separated)
    #[arg(long, value_delimiter = ',')]
    files: Vec<String>,

    /// Manifest listing files to commit, one per line
    #[arg(long)]
    files_from: Option<PathBuf>,

    /// Directory the file paths are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Pull request title
    #[arg(long)]
    title: String,

    /// Commit message (defaults to the title)
    #[arg(long)]
    message: Option<String>,

    /// Pull request body
    #[arg(long, default_value = "")]
    body: String,

    /// Key of the linked issue to update (e.g. WEB-01)
    #[arg(long)]
    issue: Option<String>,

    /// Reviewers to request (comma-separated)
    #[arg(long, value_delimiter = ',')]
    reviewers: Vec<String>,

    /// Output format: text (default), json
    #[arg(long, default_value = "text")]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let token = match args.token {
        Some(token) => token,
        None => std::env::var("GITHUB_TOKEN").context("GH_TOKEN or GITHUB_TOKEN is required")?,
    };

    let mut files = args.files;
    if let Some(manifest) = &args.files_from {
        let text = fs::read_to_string(manifest)
            .with_context(|| format!("Failed to read file manifest {}", manifest.display()))?;
        files.extend(pr::parse_manifest(&text));
    }

    let mut plan = PullRequestPlan::new(&args.branch, &args.base, &args.title)
        .files(files)
        .body(args.body)
        .reviewers(args.reviewers);
    if let Some(message) = args.message {
        plan = plan.commit_message(message);
    }
    if let Some(issue) = args.issue {
        plan = plan.issue(issue);
    }

    let client = GitHubClient::new(&args.repo, token)?.with_api_url(args.api_url);

    info!(
        repo = %args.repo,
        branch = %plan.branch,
        base = %plan.base,
        files = plan.files.len(),
        "Opening pull request"
    );
    let outcome = pr::run(&client, &plan, &args.root).await?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&outcome)?),
        _ => println!("{}", outcome.html_url),
    }

    Ok(())
}
