//! Extracted per-variant rows.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::comparison::{ExtractorKind, Variant};
use crate::error::{ReportError, Result};

/// A typed value pulled out of a result document. Numbers are always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum MetricValue {
    Number(f64),
    Integer(i64),
    NumberList(Vec<f64>),
    Boolean(bool),
    Label(String),
}

impl MetricValue {
    pub fn kind(&self) -> ExtractorKind {
        match self {
            MetricValue::Number(_) => ExtractorKind::Number,
            MetricValue::Integer(_) => ExtractorKind::Integer,
            MetricValue::NumberList(_) => ExtractorKind::NumberList,
            MetricValue::Boolean(_) => ExtractorKind::Boolean,
            MetricValue::Label(_) => ExtractorKind::Label,
        }
    }
}

/// Named value inside a [`Row`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowField {
    pub name: String,
    pub value: MetricValue,
}

/// Fully validated extraction result for one variant.
///
/// Only constructed when every declared field was present and well-typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    variant: Variant,
    fields: Vec<RowField>,
    source: PathBuf,
    source_digest: String,
}

impl Row {
    pub(crate) fn new(
        variant: Variant,
        fields: Vec<RowField>,
        source: PathBuf,
        source_digest: String,
    ) -> Self {
        Self {
            variant,
            fields,
            source,
            source_digest,
        }
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[RowField] {
        &self.fields
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn source_digest(&self) -> &str {
        &self.source_digest
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn number(&self, name: &str) -> Result<f64> {
        match self.get(name) {
            Some(MetricValue::Number(n)) => Ok(*n),
            other => Err(self.undeclared(name, ExtractorKind::Number, other)),
        }
    }

    pub fn integer(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(MetricValue::Integer(n)) => Ok(*n),
            other => Err(self.undeclared(name, ExtractorKind::Integer, other)),
        }
    }

    pub fn number_list(&self, name: &str) -> Result<&[f64]> {
        match self.get(name) {
            Some(MetricValue::NumberList(values)) => Ok(values),
            other => Err(self.undeclared(name, ExtractorKind::NumberList, other)),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            Some(MetricValue::Boolean(b)) => Ok(*b),
            other => Err(self.undeclared(name, ExtractorKind::Boolean, other)),
        }
    }

    pub fn label(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(MetricValue::Label(text)) => Ok(text),
            other => Err(self.undeclared(name, ExtractorKind::Label, other)),
        }
    }

    // A row never carries an unexpected kind unless the chart and the set
    // declaration disagree, so this is a catalog error rather than a type error.
    fn undeclared(
        &self,
        name: &str,
        wanted: ExtractorKind,
        found: Option<&MetricValue>,
    ) -> ReportError {
        let found = match found {
            Some(value) => format!("declared as {}", value.kind()),
            None => "not declared".to_string(),
        };
        ReportError::Catalog(format!(
            "row `{}` field `{name}` requested as {wanted} but {found}",
            self.variant.name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        Row::new(
            Variant::new("Atomic", "atomic", "#E45756"),
            vec![
                RowField {
                    name: "throughput".to_string(),
                    value: MetricValue::Number(120.5),
                },
                RowField {
                    name: "passed".to_string(),
                    value: MetricValue::Boolean(true),
                },
            ],
            PathBuf::from("rc-atomic.summary.json"),
            "abc".to_string(),
        )
    }

    #[test]
    fn test_row_typed_accessors() {
        let row = sample_row();
        assert_eq!(row.number("throughput").unwrap(), 120.5);
        assert!(row.flag("passed").unwrap());
        assert_eq!(row.fields()[0].name, "throughput");
    }

    #[test]
    fn test_row_accessor_kind_mismatch_is_catalog_error() {
        let row = sample_row();
        let err = row.flag("throughput").unwrap_err();
        assert!(matches!(err, ReportError::Catalog(_)));
        assert!(err.to_string().contains("declared as number"));

        let err = row.number("latencyP95").unwrap_err();
        assert!(err.to_string().contains("not declared"));
    }

    #[test]
    fn test_metric_value_serde_shape() {
        let value = serde_json::to_value(MetricValue::NumberList(vec![1.0, 2.0])).unwrap();
        assert_eq!(value, serde_json::json!({ "kind": "numberList", "value": [1.0, 2.0] }));
    }
}
