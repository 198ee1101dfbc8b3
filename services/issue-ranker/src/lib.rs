//! Issue Ranker Library
//!
//! Picks the most valuable issues out of a backlog document.
//!
//! ## Binaries
//!
//! - `select-top-issues`: Rank a backlog file and write the top N issues
//!
//! ## Ranking
//!
//! Issues are ordered by priority (`P1` > `P2` > `P3`), then impact
//! (`HIGH` > `MEDIUM` > `LOW`), then estimate (`XS` < `S` < `M` < `L` < `XL`).
//! Missing values come from `priority:` / `impact:` labels or fall back to
//! `P3` / `LOW` / `M`. Ties keep their backlog order.
//!
//! ## Example
//!
//! ```bash
//! select-top-issues backlog/issues.yaml backlog/top10.yaml --limit 10
//! ```

pub mod document;
pub mod ranker;
pub mod tier;

pub use document::{select_top_issues, DocumentError, IssueDocument, OutputFormat, DEFAULT_KEY};
pub use ranker::{normalize, select, sort_key, Normalized, SortKey};
pub use tier::{Estimate, Impact, Priority, UnknownTier};
