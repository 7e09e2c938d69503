//! Result documents and dotted-path field resolution.
//!
//! Every extractor funnels through [`ResultDocument::require`], which walks a
//! [`FieldPath`] one key at a time and stops at the first segment that cannot
//! be resolved. The reported path is the prefix up to and including that
//! segment, so a key missing at depth *d* yields a path of exactly *d*
//! segments.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{ReportError, Result};

/// Ordered, non-empty sequence of keys into a nested document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(ReportError::Catalog("field path must not be empty".to_string()));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ReportError::Catalog(format!(
                "field path `{}` contains an empty segment",
                segments.join(".")
            )));
        }
        Ok(Self { segments })
    }

    /// Parse `a.b.c` into three segments.
    pub fn parse(dotted: &str) -> Result<Self> {
        Self::new(dotted.split('.'))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    fn prefix(&self, depth: usize) -> String {
        self.segments[..depth].join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl TryFrom<String> for FieldPath {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.dotted()
    }
}

/// Parsed result file. Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultDocument {
    source: PathBuf,
    digest: String,
    root: Value,
}

impl ResultDocument {
    /// Read and parse a JSON result file.
    ///
    /// # Errors
    ///
    /// `ReportError::Load` when the file is absent, unreadable, or not
    /// well-formed JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ReportError::load(path, "file not found"));
        }
        let bytes = std::fs::read(path).map_err(|e| ReportError::load(path, e))?;
        let root: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ReportError::load(path, format!("invalid JSON: {e}")))?;

        Ok(Self {
            source: path.to_path_buf(),
            digest: sha256_hex(&bytes),
            root,
        })
    }

    /// Wrap an already-parsed value. The digest covers its compact encoding.
    pub fn from_value(source: impl Into<PathBuf>, root: Value) -> Self {
        let digest = sha256_hex(root.to_string().as_bytes());
        Self {
            source: source.into(),
            digest,
            root,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// SHA-256 hex of the bytes the document was parsed from.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Resolve `path`, failing on the first missing key or non-object step.
    ///
    /// # Errors
    ///
    /// `ReportError::Schema` naming the dotted prefix that ends at the failing
    /// segment.
    pub fn require(&self, path: &FieldPath) -> Result<&Value> {
        let mut cursor = &self.root;
        for (depth, key) in path.segments().iter().enumerate() {
            cursor = match cursor.as_object().and_then(|map| map.get(key)) {
                Some(next) => next,
                None => {
                    return Err(ReportError::Schema {
                        file: self.source.clone(),
                        field: path.prefix(depth + 1),
                    })
                }
            };
        }
        Ok(cursor)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn doc(value: Value) -> ResultDocument {
        ResultDocument::from_value("fixture.json", value)
    }

    #[test]
    fn test_field_path_parse_and_display() {
        let path = FieldPath::parse("metrics.latencyMsP95.values").unwrap();
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.to_string(), "metrics.latencyMsP95.values");
    }

    #[test]
    fn test_field_path_rejects_empty() {
        assert!(FieldPath::new(Vec::<String>::new()).is_err());
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("a..b").is_err());
    }

    #[test]
    fn test_field_path_serde_as_dotted_string() {
        let path = FieldPath::parse("latencyMs.p95").unwrap();
        let encoded = serde_json::to_value(&path).unwrap();
        assert_eq!(encoded, json!("latencyMs.p95"));
        let decoded: FieldPath = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, path);
        assert!(serde_json::from_value::<FieldPath>(json!("")).is_err());
    }

    #[test]
    fn test_require_resolves_nested_value() {
        let d = doc(json!({ "latencyMs": { "p95": 12.5 } }));
        let value = d.require(&FieldPath::parse("latencyMs.p95").unwrap()).unwrap();
        assert_eq!(value, &json!(12.5));
    }

    #[test]
    fn test_require_reports_first_missing_segment() {
        let d = doc(json!({ "metrics": { "throughputRps": {} } }));
        let err = d
            .require(&FieldPath::parse("metrics.latencyMsP95.values").unwrap())
            .unwrap_err();
        assert_eq!(err.field(), Some("metrics.latencyMsP95"));
        assert_eq!(err.file(), Some(Path::new("fixture.json")));
    }

    #[test]
    fn test_require_stops_at_non_object_step() {
        let d = doc(json!({ "metrics": 5 }));
        let err = d
            .require(&FieldPath::parse("metrics.latencyMsP95.values").unwrap())
            .unwrap_err();
        assert_eq!(err.field(), Some("metrics.latencyMsP95"));
    }

    #[test]
    fn test_require_missing_at_each_depth() {
        let d = doc(json!({ "a": { "b": { "c": true } } }));
        for (dotted, expected) in [("x.b.c", "x"), ("a.x.c", "a.x"), ("a.b.x", "a.b.x")] {
            let path = FieldPath::parse(dotted).unwrap();
            let err = d.require(&path).unwrap_err();
            assert_eq!(err.field(), Some(expected), "path {dotted}");
        }
    }

    #[test]
    fn test_load_missing_file_is_load_error() {
        let dir = tempdir().unwrap();
        let err = ResultDocument::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ReportError::Load { .. }));
    }

    #[test]
    fn test_load_invalid_json_is_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{ \"latencyMs\": ").unwrap();
        let err = ResultDocument::load(&path).unwrap_err();
        assert!(matches!(err, ReportError::Load { .. }));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_load_digest_is_deterministic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ok.json");
        std::fs::write(&path, b"{\"throughputRps\": 100}").unwrap();
        let first = ResultDocument::load(&path).unwrap();
        let second = ResultDocument::load(&path).unwrap();
        assert_eq!(first.digest(), second.digest());
        assert_eq!(first.digest().len(), 64);
    }
}
