//! Issue Documents
//!
//! Loading and writing of backlog documents: a mapping whose collection key
//! holds the sequence of issue records.

use clap::ValueEnum;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::ranker;

/// Top-level key holding the issue sequence
pub const DEFAULT_KEY: &str = "issues";

/// Errors that can occur while loading or writing issue documents
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Input path does not exist
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Reading the input failed
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the output failed
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not valid YAML, or YAML output failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document root is not a mapping
    #[error("Input document must be a mapping with a top-level sequence")]
    NotAMapping,

    /// Collection key is absent
    #[error("Input document must contain a top-level '{0}' sequence")]
    MissingKey(String),

    /// Collection key does not hold a sequence
    #[error("'{0}' must be a sequence")]
    NotASequence(String),

    /// An entry of the sequence is not a mapping
    #[error("Issue at index {index} is not a mapping")]
    RecordNotAMapping { index: usize },
}

/// Serialization format of a written document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// A backlog document
#[derive(Debug, Clone, PartialEq)]
pub struct IssueDocument {
    /// Top-level key the issues live under
    pub key: String,
    /// Issue records in document order
    pub issues: Vec<Value>,
}

impl IssueDocument {
    /// Create a document from records
    pub fn new(key: impl Into<String>, issues: Vec<Value>) -> Self {
        Self {
            key: key.into(),
            issues,
        }
    }

    /// Parse and validate a document. JSON input is accepted as YAML.
    pub fn parse(text: &str, key: &str) -> Result<Self, DocumentError> {
        let mut root: Value = serde_yaml::from_str(text)?;
        root.apply_merge()?;

        let Value::Mapping(mut root) = root else {
            return Err(DocumentError::NotAMapping);
        };

        let issues = match root.remove(key) {
            Some(Value::Sequence(issues)) => issues,
            Some(_) => return Err(DocumentError::NotASequence(key.to_string())),
            None => return Err(DocumentError::MissingKey(key.to_string())),
        };

        if let Some(index) = issues.iter().position(|issue| !issue.is_mapping()) {
            return Err(DocumentError::RecordNotAMapping { index });
        }

        Ok(Self::new(key, issues))
    }

    /// Read and parse a document from disk
    pub fn load(path: &Path, key: &str) -> Result<Self, DocumentError> {
        if !path.exists() {
            return Err(DocumentError::InputNotFound(path.to_path_buf()));
        }

        let text = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let document = Self::parse(&text, key)?;
        debug!(
            path = %path.display(),
            issues = document.issues.len(),
            "Loaded issue document"
        );
        Ok(document)
    }

    /// A new document holding the top `limit` issues
    pub fn ranked(&self, limit: usize) -> Self {
        Self::new(self.key.clone(), ranker::select(&self.issues, limit))
    }

    /// Serialize as `{<key>: [issues...]}`
    pub fn render(&self, format: OutputFormat) -> Result<String, DocumentError> {
        let mut root = Mapping::new();
        root.insert(
            Value::String(self.key.clone()),
            Value::Sequence(self.issues.clone()),
        );
        let root = Value::Mapping(root);

        let text = match format {
            OutputFormat::Yaml => serde_yaml::to_string(&root)?,
            OutputFormat::Json => {
                let mut text = serde_json::to_string_pretty(&root)?;
                text.push('\n');
                text
            }
        };
        Ok(text)
    }

    /// Render, then write to `path`, creating parent directories.
    ///
    /// Nothing is touched on disk if rendering fails.
    pub fn write(&self, path: &Path, format: OutputFormat) -> Result<(), DocumentError> {
        let text = self.render(format)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| DocumentError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, text).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), issues = self.issues.len(), "Wrote issue document");
        Ok(())
    }
}

/// Load `input`, rank it and write the top `limit` issues to `output`.
///
/// The output path is only created once the input has been validated.
pub fn select_top_issues(
    input: &Path,
    output: &Path,
    key: &str,
    limit: usize,
    format: OutputFormat,
) -> Result<usize, DocumentError> {
    let document = IssueDocument::load(input, key)?;
    let top = document.ranked(limit);
    top.write(output, format)?;
    Ok(top.issues.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const BACKLOG: &str = r#"
meta: {owner: platform}
issues:
  - id: 1
    title: Low value chore
    priority: P3
  - id: 2
    title: Broken login
    priority: P1
  - id: 3
    title: Session leak
    priority: P1
    impact: HIGH
    labels: [auth, security]
"#;

    #[test]
    fn test_parse_valid_document() {
        let doc = IssueDocument::parse(BACKLOG, DEFAULT_KEY).unwrap();
        assert_eq!(doc.key, "issues");
        assert_eq!(doc.issues.len(), 3);
    }

    #[test]
    fn test_parse_json_input() {
        let doc = IssueDocument::parse(r#"{"issues": [{"id": 1}, {"id": 2}]}"#, DEFAULT_KEY)
            .unwrap();
        assert_eq!(doc.issues.len(), 2);
    }

    #[test]
    fn test_empty_mapping_is_missing_key() {
        let err = IssueDocument::parse("{}", DEFAULT_KEY).unwrap_err();
        assert!(matches!(err, DocumentError::MissingKey(ref k) if k == "issues"));
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let err = IssueDocument::parse("- id: 1\n", DEFAULT_KEY).unwrap_err();
        assert!(matches!(err, DocumentError::NotAMapping));
    }

    #[test]
    fn test_non_sequence_value_is_rejected() {
        let err = IssueDocument::parse("issues: {id: 1}\n", DEFAULT_KEY).unwrap_err();
        assert!(matches!(err, DocumentError::NotASequence(_)));
        assert_eq!(err.to_string(), "'issues' must be a sequence");
    }

    #[test]
    fn test_non_mapping_record_is_rejected() {
        let err = IssueDocument::parse("issues: [{id: 1}, oops]\n", DEFAULT_KEY).unwrap_err();
        assert!(matches!(err, DocumentError::RecordNotAMapping { index: 1 }));
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let err = IssueDocument::parse("issues: [unclosed\n", DEFAULT_KEY).unwrap_err();
        assert!(matches!(err, DocumentError::Yaml(_)));
    }

    #[test]
    fn test_custom_key() {
        let doc = IssueDocument::parse("backlog: [{id: 9}]\n", "backlog").unwrap();
        assert_eq!(doc.key, "backlog");
        assert!(IssueDocument::parse("backlog: [{id: 9}]\n", DEFAULT_KEY).is_err());
    }

    #[test]
    fn test_empty_sequence_is_valid() {
        let doc = IssueDocument::parse("issues: []\n", DEFAULT_KEY).unwrap();
        assert!(doc.ranked(10).issues.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = IssueDocument::load(&dir.path().join("nope.yaml"), DEFAULT_KEY).unwrap_err();
        assert!(matches!(err, DocumentError::InputNotFound(_)));
    }

    #[test]
    fn test_ranked_write_and_reload() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("issues.yaml");
        let output = dir.path().join("out/nested/top.yaml");
        fs::write(&input, BACKLOG).unwrap();

        let doc = IssueDocument::load(&input, DEFAULT_KEY).unwrap();
        doc.ranked(2).write(&output, OutputFormat::Yaml).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(!written.contains("meta"));

        let reloaded = IssueDocument::load(&output, DEFAULT_KEY).unwrap();
        let ids: Vec<u64> = reloaded
            .issues
            .iter()
            .map(|i| i.get("id").and_then(Value::as_u64).unwrap())
            .collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(reloaded.issues[0], doc.issues[2]);
    }

    #[test]
    fn test_record_key_order_is_preserved() {
        let doc = IssueDocument::parse(BACKLOG, DEFAULT_KEY).unwrap();
        let yaml = doc.ranked(1).render(OutputFormat::Yaml).unwrap();

        let id = yaml.find("id: 3").unwrap();
        let title = yaml.find("title: Session leak").unwrap();
        let labels = yaml.find("labels:").unwrap();
        assert!(id < title && title < labels);
    }

    #[test]
    fn test_render_json() {
        let doc = IssueDocument::parse(BACKLOG, DEFAULT_KEY).unwrap();
        let json = doc.ranked(1).render(OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["issues"][0]["id"], 3);
        assert_eq!(value["issues"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_output_format_values() {
        assert_eq!(OutputFormat::from_str("json", true), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("YAML", true), Ok(OutputFormat::Yaml));
        assert!(OutputFormat::from_str("jsno", true).is_err());
    }

    #[test]
    fn test_merge_keys_are_resolved() {
        let text = r#"
defaults: &urgent {priority: P1, impact: HIGH}
issues:
  - {id: 1, priority: P2}
  - {<<: *urgent, id: 2}
"#;
        let doc = IssueDocument::parse(text, DEFAULT_KEY).unwrap();
        let top = doc.ranked(1);

        assert_eq!(top.issues[0].get("id").and_then(Value::as_u64), Some(2));
        assert_eq!(top.issues[0].get("priority").and_then(Value::as_str), Some("P1"));
        assert!(top.issues[0].get("<<").is_none());
    }

    #[test]
    fn test_select_top_issues_writes_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("issues.yaml");
        let output = dir.path().join("top/top.json");
        fs::write(&input, BACKLOG).unwrap();

        let written =
            select_top_issues(&input, &output, DEFAULT_KEY, 10, OutputFormat::Json).unwrap();

        assert_eq!(written, 3);
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["issues"][0]["id"], 3);
    }

    #[test]
    fn test_malformed_input_creates_no_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("issues.yaml");
        let output_dir = dir.path().join("out");
        let output = output_dir.join("top.yaml");
        fs::write(&input, "{}\n").unwrap();

        let err = select_top_issues(&input, &output, DEFAULT_KEY, 10, OutputFormat::Yaml)
            .unwrap_err();

        assert!(matches!(err, DocumentError::MissingKey(ref k) if k == "issues"));
        assert!(!output.exists());
        assert!(!output_dir.exists());
    }

    #[test]
    fn test_missing_input_creates_no_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out/top.yaml");

        let err = select_top_issues(
            &dir.path().join("missing.yaml"),
            &output,
            DEFAULT_KEY,
            10,
            OutputFormat::Yaml,
        )
        .unwrap_err();

        assert!(matches!(err, DocumentError::InputNotFound(_)));
        assert!(!output.exists());
    }
}
