//! GitHub Bot Tools Library
//!
//! Rust utilities for automating pull requests against a GitHub repository.
//!
//! ## Binaries
//!
//! - `open-pr`: Commit local files to a branch, open a PR and update the
//!   linked issue
//!
//! ## Flow
//!
//! 1. Resolve the base branch and create the work branch from it
//! 2. Commit the listed files as a single tree on top of the base
//! 3. Open the pull request
//! 4. Tick the checklist of the linked issue and comment the PR URL
//! 5. Request review
//!
//! ## Example
//!
//! ```bash
//! GH_TOKEN=$TOKEN open-pr \
//!   --repo acme/web \
//!   --branch feature/WEB-01-auth \
//!   --files apps/web/middleware.ts,apps/web/src/app/login/page.tsx \
//!   --title "WEB-01: Web authentication" \
//!   --issue WEB-01
//! ```

pub mod client;
pub mod pr;

pub use client::{GitHubClient, GitHubError};
pub use pr::{PullRequestOutcome, PullRequestPlan};
