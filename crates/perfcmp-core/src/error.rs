//! Error taxonomy for report ingestion, assembly and rendering.

use std::path::{Path, PathBuf};

use crate::domain::ExtractorKind;

/// Errors produced while turning result documents into rendered charts.
///
/// `Load`, `Schema` and `Type` are never recovered internally; they travel to
/// the outermost boundary, which prints the message and exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to load {}: {reason}", .file.display())]
    Load { file: PathBuf, reason: String },

    #[error("missing required field `{field}` in {}", .file.display())]
    Schema { file: PathBuf, field: String },

    #[error("field `{field}` must be {expected} ({reason}) in {}", .file.display())]
    Type {
        file: PathBuf,
        field: String,
        expected: ExtractorKind,
        /// 1-based position of the offending element for `numberList` fields.
        index: Option<usize>,
        reason: String,
    },

    #[error("missing files for set `{set}`: {}", join_paths(.missing))]
    PolicyAbort { set: String, missing: Vec<PathBuf> },

    #[error("no charts were generated; provide at least one complete set of result files")]
    NoOutput,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("unknown comparison set `{set}` for report `{report}`")]
    UnknownSet { report: String, set: String },

    #[error("invalid comparison declaration: {0}")]
    Catalog(String),

    #[error("failed to render chart to {}: {reason}", .target.display())]
    Render { target: PathBuf, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    pub(crate) fn load(file: &Path, reason: impl ToString) -> Self {
        Self::Load {
            file: file.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Dotted field path carried by schema and type errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Schema { field, .. } | Self::Type { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Source file the error refers to, when there is exactly one.
    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::Load { file, .. } | Self::Schema { file, .. } | Self::Type { file, .. } => {
                Some(file)
            }
            _ => None,
        }
    }
}

pub(crate) fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_field_and_file() {
        let err = ReportError::Schema {
            file: PathBuf::from("results/rc-atomic.summary.json"),
            field: "latencyMs.p95".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("`latencyMs.p95`"));
        assert!(msg.contains("results/rc-atomic.summary.json"));
        assert_eq!(err.field(), Some("latencyMs.p95"));
    }

    #[test]
    fn test_type_error_names_expected_kind() {
        let err = ReportError::Type {
            file: PathBuf::from("a.json"),
            field: "metrics.throughputRps.values".to_string(),
            expected: ExtractorKind::NumberList,
            index: Some(2),
            reason: "non-numeric value at index 2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("numberList"));
        assert!(msg.contains("index 2"));
        assert!(msg.contains("a.json"));
    }

    #[test]
    fn test_policy_abort_lists_every_missing_path() {
        let err = ReportError::PolicyAbort {
            set: "spread".to_string(),
            missing: vec![PathBuf::from("a.json"), PathBuf::from("b.json")],
        };
        let msg = err.to_string();
        assert!(msg.contains("`spread`"));
        assert!(msg.contains("a.json, b.json"));
        assert!(err.file().is_none());
    }
}
