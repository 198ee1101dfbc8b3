//! Pull Request Automation
//!
//! Commits a set of files to a work branch, opens a pull request and
//! updates the linked issue.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::client::{BranchOutcome, GitHubClient, IssueSummary, TreeEntry};

/// What to commit and how to present it
#[derive(Debug, Clone)]
pub struct PullRequestPlan {
    /// Work branch the commit lands on
    pub branch: String,
    /// Branch the work branch starts from and the PR targets
    pub base: String,
    /// Repository-relative paths to commit
    pub files: Vec<String>,
    pub commit_message: String,
    pub title: String,
    pub body: String,
    /// Search term locating the linked issue (e.g. "WEB-01")
    pub issue_key: Option<String>,
    pub reviewers: Vec<String>,
}

impl PullRequestPlan {
    /// Create a plan; the commit message defaults to the title
    pub fn new(
        branch: impl Into<String>,
        base: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let title = title.into();
        Self {
            branch: branch.into(),
            base: base.into(),
            files: Vec::new(),
            commit_message: title.clone(),
            title,
            body: String::new(),
            issue_key: None,
            reviewers: Vec::new(),
        }
    }

    pub fn files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    pub fn commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn issue(mut self, key: impl Into<String>) -> Self {
        self.issue_key = Some(key.into());
        self
    }

    pub fn reviewers(mut self, reviewers: Vec<String>) -> Self {
        self.reviewers = reviewers;
        self
    }
}

/// Result of a PR automation run
#[derive(Debug, Clone, Serialize)]
pub struct PullRequestOutcome {
    /// PR number
    pub number: u64,
    /// PR web URL
    pub html_url: String,
    /// Linked issue, if one was found
    pub issue_number: Option<u64>,
    /// Whether the issue checklist was ticked
    pub issue_updated: bool,
    /// Whether the PR link was commented on the issue
    pub issue_commented: bool,
    /// Whether the review request succeeded
    pub reviewers_requested: bool,
    /// Listed files that did not exist locally
    pub skipped_files: Vec<String>,
}

/// Read the listed files under `root` into tree entries.
///
/// Missing files are skipped and returned separately.
pub fn collect_tree_entries(root: &Path, files: &[String]) -> Result<(Vec<TreeEntry>, Vec<String>)> {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for file in files {
        let rel = file.trim_start_matches("./");
        let path = root.join(rel);

        if !path.is_file() {
            warn!(file = %rel, "Skipping missing file");
            skipped.push(rel.to_string());
            continue;
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        entries.push(TreeEntry::blob(rel, content));
    }

    Ok((entries, skipped))
}

/// Parse a file manifest: one path per line, `#` starts a comment
pub fn parse_manifest(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tick every unchecked markdown task box
pub fn tick_checkboxes(body: &str) -> String {
    body.replace("- [ ] ", "- [x] ")
}

/// Search query for the issue linked to `key`
pub fn issue_query(owner: &str, repo: &str, key: &str) -> String {
    format!("repo:{}/{} is:issue {}", owner, repo, key)
}

/// First hit whose title mentions `key`, else the first hit
pub fn pick_issue<'a>(items: &'a [IssueSummary], key: &str) -> Option<&'a IssueSummary> {
    items
        .iter()
        .find(|item| item.title.contains(key))
        .or_else(|| items.first())
}

/// Run the full flow.
///
/// Branch, commit and PR creation errors abort the run. Issue and reviewer
/// updates only log a warning.
pub async fn run(
    client: &GitHubClient,
    plan: &PullRequestPlan,
    root: &Path,
) -> Result<PullRequestOutcome> {
    let base_sha = client
        .branch_sha(&plan.base)
        .await
        .with_context(|| format!("Failed to resolve base branch {}", plan.base))?;
    info!(base = %plan.base, sha = %base_sha, "Resolved base branch");

    match client
        .create_branch(&plan.branch, &base_sha)
        .await
        .with_context(|| format!("Failed to create branch {}", plan.branch))?
    {
        BranchOutcome::Created => info!(branch = %plan.branch, "Created branch"),
        BranchOutcome::AlreadyExists => info!(branch = %plan.branch, "Branch already exists"),
    }

    let (entries, skipped_files) = collect_tree_entries(root, &plan.files)?;
    if entries.is_empty() {
        warn!("No files to commit, the commit will match the base tree");
    }

    let tree_sha = client
        .create_tree(&base_sha, &entries)
        .await
        .context("Failed to create tree")?;

    let commit_sha = client
        .create_commit(&plan.commit_message, &tree_sha, &[base_sha.clone()])
        .await
        .context("Failed to create commit")?;
    info!(sha = %commit_sha, files = entries.len(), "Created commit");

    client
        .update_branch(&plan.branch, &commit_sha)
        .await
        .with_context(|| format!("Failed to update branch {}", plan.branch))?;

    let pr = client
        .create_pull_request(&plan.title, &plan.branch, &plan.base, &plan.body)
        .await
        .context("Failed to create pull request")?;
    info!(number = pr.number, url = %pr.html_url, "Opened pull request");

    let mut outcome = PullRequestOutcome {
        number: pr.number,
        html_url: pr.html_url.clone(),
        issue_number: None,
        issue_updated: false,
        issue_commented: false,
        reviewers_requested: false,
        skipped_files,
    };

    if let Some(key) = &plan.issue_key {
        outcome.issue_number = find_issue(client, key).await;
        if let Some(number) = outcome.issue_number {
            let update = update_issue(client, number, &pr.html_url).await;
            outcome.issue_updated = update.body_updated;
            outcome.issue_commented = update.commented;
        }
    }

    if !plan.reviewers.is_empty() {
        match client.request_reviewers(pr.number, &plan.reviewers).await {
            Ok(()) => {
                info!(reviewers = ?plan.reviewers, "Requested review");
                outcome.reviewers_requested = true;
            }
            Err(e) => warn!(error = %e, "Failed to request reviewers"),
        }
    }

    Ok(outcome)
}

async fn find_issue(client: &GitHubClient, key: &str) -> Option<u64> {
    let query = issue_query(client.owner(), client.repo(), key);

    match client.search_issues(&query).await {
        Ok(items) => {
            let number = pick_issue(&items, key).map(|item| item.number);
            if number.is_none() {
                warn!(issue = %key, "No issue found");
            }
            number
        }
        Err(e) => {
            warn!(issue = %key, error = %e, "Issue search failed");
            None
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct IssueUpdate {
    body_updated: bool,
    commented: bool,
}

/// Tick the checklist and comment the PR link. The comment is posted even
/// when the body update fails.
async fn update_issue(client: &GitHubClient, number: u64, pr_url: &str) -> IssueUpdate {
    let issue = match client.get_issue(number).await {
        Ok(issue) => issue,
        Err(e) => {
            warn!(issue = number, error = %e, "Failed to fetch issue");
            return IssueUpdate::default();
        }
    };

    let body = tick_checkboxes(issue.body.as_deref().unwrap_or_default());
    let body_updated = match client.update_issue_body(issue.number, &body).await {
        Ok(()) => true,
        Err(e) => {
            warn!(issue = number, error = %e, "Failed to update issue body");
            false
        }
    };

    let comment = format!("PR created: {}", pr_url);
    let commented = match client.create_comment(issue.number, &comment).await {
        Ok(()) => true,
        Err(e) => {
            warn!(issue = number, error = %e, "Failed to comment on issue");
            false
        }
    };

    info!(issue = number, body_updated, commented, "Updated linked issue");
    IssueUpdate {
        body_updated,
        commented,
    }
}
