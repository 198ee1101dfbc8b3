//! GitHub REST Client
//!
//! Typed wrapper over the handful of GitHub REST endpoints the PR automation
//! needs: git refs, trees and commits, pull requests, issues and search.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Public GitHub API endpoint
pub const GITHUB_API: &str = "https://api.github.com";

const USER_AGENT: &str = "backlog-tools-github-bot";
const API_VERSION: &str = "2022-11-28";

/// Errors returned by [`GitHubClient`]
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Transport or decoding failure
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the API
    #[error("GitHub API error during {operation} ({status}): {body}")]
    Api {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    /// Repository is not in `owner/repo` form
    #[error("Invalid repository format: {0}. Expected: owner/repo")]
    InvalidRepository(String),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// Outcome of creating a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOutcome {
    Created,
    AlreadyExists,
}

/// One entry of a git tree, with inline content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl TreeEntry {
    /// A regular (non-executable) file
    pub fn blob(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: "100644".to_string(),
            kind: "blob".to_string(),
            content: content.into(),
        }
    }
}

/// Pull request as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// Search hit
#[derive(Debug, Clone, Deserialize)]
pub struct IssueSummary {
    pub number: u64,
    #[serde(default)]
    pub title: String,
}

/// Issue details
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

/// Tree and commit creation both answer with a `sha`
#[derive(Debug, Deserialize)]
struct Created {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    items: Vec<IssueSummary>,
}

/// Split `owner/repo`
pub fn parse_repository(repository: &str) -> Result<(String, String)> {
    match repository.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GitHubError::InvalidRepository(repository.to_string())),
    }
}

/// GitHub API client scoped to one repository
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a client for `owner/repo` against the public API
    pub fn new(repository: &str, token: impl Into<String>) -> Result<Self> {
        let (owner, repo) = parse_repository(repository)?;
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            api_url: GITHUB_API.to_string(),
            token: token.into(),
            owner,
            repo,
        })
    }

    /// Point the client at another API root (GitHub Enterprise)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_url, self.owner, self.repo, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        debug!(operation, "Calling GitHub API");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                operation,
                status,
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// SHA the branch currently points at
    pub async fn branch_sha(&self, branch: &str) -> Result<String> {
        let url = self.repo_url(&format!("/git/ref/heads/{}", branch));
        let git_ref: GitRef = self
            .send("resolve branch", self.request(Method::GET, &url))
            .await?;
        Ok(git_ref.object.sha)
    }

    /// Create `branch` at `sha`; an existing branch is not an error
    pub async fn create_branch(&self, branch: &str, sha: &str) -> Result<BranchOutcome> {
        let url = self.repo_url("/git/refs");
        let request = self
            .request(Method::POST, &url)
            .json(&json!({ "ref": format!("refs/heads/{}", branch), "sha": sha }));

        match self.send::<serde_json::Value>("create branch", request).await {
            Ok(_) => Ok(BranchOutcome::Created),
            Err(GitHubError::Api { body, .. }) if body.contains("Reference already exists") => {
                Ok(BranchOutcome::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    /// Create a tree on top of `base_tree`, returning its SHA
    pub async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> Result<String> {
        let url = self.repo_url("/git/trees");
        let request = self
            .request(Method::POST, &url)
            .json(&json!({ "base_tree": base_tree, "tree": entries }));

        let tree: Created = self.send("create tree", request).await?;
        Ok(tree.sha)
    }

    /// Create a commit, returning its SHA
    pub async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String> {
        let url = self.repo_url("/git/commits");
        let request = self.request(Method::POST, &url).json(&json!({
            "message": message,
            "tree": tree,
            "parents": parents,
        }));

        let commit: Created = self.send("create commit", request).await?;
        Ok(commit.sha)
    }

    /// Force-move `branch` to `sha`
    pub async fn update_branch(&self, branch: &str, sha: &str) -> Result<()> {
        let url = self.repo_url(&format!("/git/refs/heads/{}", branch));
        let request = self
            .request(Method::PATCH, &url)
            .json(&json!({ "sha": sha, "force": true }));

        self.send::<serde_json::Value>("update branch", request)
            .await?;
        Ok(())
    }

    pub async fn create_pull_request(
        &self,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<PullRequest> {
        let url = self.repo_url("/pulls");
        let request = self.request(Method::POST, &url).json(&json!({
            "title": title,
            "head": head,
            "base": base,
            "body": body,
        }));

        self.send("create pull request", request).await
    }

    /// Issue search across GitHub
    pub async fn search_issues(&self, query: &str) -> Result<Vec<IssueSummary>> {
        let url = format!("{}/search/issues", self.api_url);
        let request = self.request(Method::GET, &url).query(&[("q", query)]);

        let results: SearchResults = self.send("search issues", request).await?;
        Ok(results.items)
    }

    pub async fn get_issue(&self, number: u64) -> Result<Issue> {
        let url = self.repo_url(&format!("/issues/{}", number));
        self.send("get issue", self.request(Method::GET, &url))
            .await
    }

    pub async fn update_issue_body(&self, number: u64, body: &str) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{}", number));
        let request = self
            .request(Method::PATCH, &url)
            .json(&json!({ "body": body }));

        self.send::<serde_json::Value>("update issue", request)
            .await?;
        Ok(())
    }

    pub async fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{}/comments", number));
        let request = self
            .request(Method::POST, &url)
            .json(&json!({ "body": body }));

        self.send::<serde_json::Value>("create comment", request)
            .await?;
        Ok(())
    }

    pub async fn request_reviewers(&self, pr_number: u64, reviewers: &[String]) -> Result<()> {
        let url = self.repo_url(&format!("/pulls/{}/requested_reviewers", pr_number));
        let request = self
            .request(Method::POST, &url)
            .json(&json!({ "reviewers": reviewers }));

        self.send::<serde_json::Value>("request reviewers", request)
            .await?;
        Ok(())
    }
}
