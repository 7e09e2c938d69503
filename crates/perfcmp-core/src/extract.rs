//! Typed field extractors built on [`ResultDocument::require`].
//!
//! No implicit coercion in either direction: a boolean never satisfies a
//! numeric contract and a numeric 0/1 never satisfies the boolean contract.

use serde_json::Value;

use crate::document::{FieldPath, ResultDocument};
use crate::domain::{ExtractorKind, MetricValue};
use crate::error::{ReportError, Result};

/// Extract a finite number.
pub fn extract_number(doc: &ResultDocument, path: &FieldPath) -> Result<f64> {
    let value = doc.require(path)?;
    finite_number(value).map_err(|reason| type_error(doc, path, ExtractorKind::Number, None, reason))
}

/// Extract a number encoded as an integer, e.g. a run count.
pub fn extract_integer(doc: &ResultDocument, path: &FieldPath) -> Result<i64> {
    let value = doc.require(path)?;
    let reason = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => return Ok(i),
            None if n.is_u64() => "integer out of range".to_string(),
            None => format!("non-integral value {n}"),
        },
        other => format!("found {}", kind_of(other)),
    };
    Err(type_error(doc, path, ExtractorKind::Integer, None, reason))
}

/// Extract a strict boolean.
pub fn extract_bool(doc: &ResultDocument, path: &FieldPath) -> Result<bool> {
    match doc.require(path)? {
        Value::Bool(b) => Ok(*b),
        other => Err(type_error(
            doc,
            path,
            ExtractorKind::Boolean,
            None,
            format!("found {}", kind_of(other)),
        )),
    }
}

/// Extract a non-empty list of finite numbers, preserving element order.
pub fn extract_number_list(doc: &ResultDocument, path: &FieldPath) -> Result<Vec<f64>> {
    let items = match doc.require(path)? {
        Value::Array(items) => items,
        other => {
            return Err(type_error(
                doc,
                path,
                ExtractorKind::NumberList,
                None,
                format!("found {}", kind_of(other)),
            ))
        }
    };
    if items.is_empty() {
        return Err(type_error(
            doc,
            path,
            ExtractorKind::NumberList,
            None,
            "list must not be empty".to_string(),
        ));
    }

    let mut numbers = Vec::with_capacity(items.len());
    for (offset, item) in items.iter().enumerate() {
        let index = offset + 1;
        let number = finite_number(item).map_err(|reason| {
            type_error(
                doc,
                path,
                ExtractorKind::NumberList,
                Some(index),
                format!("{reason} at index {index}"),
            )
        })?;
        numbers.push(number);
    }
    Ok(numbers)
}

/// Extract any present value as display text. Strings are kept verbatim.
pub fn extract_label(doc: &ResultDocument, path: &FieldPath) -> Result<String> {
    Ok(match doc.require(path)? {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Dispatch on `kind`.
pub fn extract(doc: &ResultDocument, path: &FieldPath, kind: ExtractorKind) -> Result<MetricValue> {
    Ok(match kind {
        ExtractorKind::Number => MetricValue::Number(extract_number(doc, path)?),
        ExtractorKind::Integer => MetricValue::Integer(extract_integer(doc, path)?),
        ExtractorKind::Boolean => MetricValue::Boolean(extract_bool(doc, path)?),
        ExtractorKind::NumberList => MetricValue::NumberList(extract_number_list(doc, path)?),
        ExtractorKind::Label => MetricValue::Label(extract_label(doc, path)?),
    })
}

fn finite_number(value: &Value) -> std::result::Result<f64, String> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => Ok(f),
            _ => Err(format!("non-finite value {n}")),
        },
        other => Err(format!("non-numeric value ({})", kind_of(other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn type_error(
    doc: &ResultDocument,
    path: &FieldPath,
    expected: ExtractorKind,
    index: Option<usize>,
    reason: String,
) -> ReportError {
    ReportError::Type {
        file: doc.source().to_path_buf(),
        field: path.dotted(),
        expected,
        index,
        reason,
    }
}
