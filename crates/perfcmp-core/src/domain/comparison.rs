//! Comparison-set declarations.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::FieldPath;
use crate::error::{ReportError, Result};

/// Value contract applied to a field after the path has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractorKind {
    /// Finite number; booleans rejected.
    Number,
    /// Number encoded as an integer; booleans and fractional encodings rejected.
    Integer,
    /// Strict boolean; numeric 0/1 rejected.
    Boolean,
    /// Non-empty list where every element satisfies `Number`.
    NumberList,
    /// Any present value, kept as display text.
    Label,
}

impl ExtractorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExtractorKind::Number => "number",
            ExtractorKind::Integer => "integer",
            ExtractorKind::Boolean => "boolean",
            ExtractorKind::NumberList => "numberList",
            ExtractorKind::Label => "label",
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named, colored identity contributing one series to a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Display name, unique within a comparison set.
    pub name: String,
    /// Strategy key, e.g. `atomic` or `optimistic`.
    pub strategy: String,
    /// Series color as `#RRGGBB`.
    pub color: String,
    /// Optional grouping tag, e.g. the isolation profile.
    pub group: Option<String>,
}

impl Variant {
    pub fn new(name: &str, strategy: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            strategy: strategy.to_string(),
            color: color.to_string(),
            group: None,
        }
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }
}

/// One required field: semantic name, location, and value contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub path: FieldPath,
    pub kind: ExtractorKind,
}

impl FieldSpec {
    pub fn new(name: &str, dotted: &str, kind: ExtractorKind) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            path: FieldPath::parse(dotted)?,
            kind,
        })
    }
}

/// A variant together with the file it is read from and the fields it must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDecl {
    pub variant: Variant,
    /// Source file, relative to the report root.
    pub file: PathBuf,
    /// Extracted in this order; the first failure stops extraction.
    pub fields: Vec<FieldSpec>,
}

impl VariantDecl {
    pub fn new(variant: Variant, file: impl Into<PathBuf>, fields: Vec<FieldSpec>) -> Self {
        Self {
            variant,
            file: file.into(),
            fields,
        }
    }

    /// Absolute location of this variant's result file under `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.file)
    }

    fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The unit of one rendered output: an ordered, pre-declared list of variants.
///
/// # Invariants
///
/// - at least one variant, and variant names are unique
/// - field names are unique within each variant
/// - every variant declares `assertion_field` with [`ExtractorKind::Boolean`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSet {
    name: String,
    title: String,
    output_stem: String,
    assertion_field: String,
    variants: Vec<VariantDecl>,
}

impl ComparisonSet {
    pub fn new(
        name: &str,
        title: &str,
        output_stem: &str,
        assertion_field: &str,
        variants: Vec<VariantDecl>,
    ) -> Result<Self> {
        if variants.is_empty() {
            return Err(ReportError::Catalog(format!(
                "comparison set `{name}` declares no variants"
            )));
        }

        let mut seen = HashSet::new();
        for decl in &variants {
            if !seen.insert(decl.variant.name.as_str()) {
                return Err(ReportError::Catalog(format!(
                    "comparison set `{name}` declares variant `{}` twice",
                    decl.variant.name
                )));
            }

            let mut field_names = HashSet::new();
            for field in &decl.fields {
                if !field_names.insert(field.name.as_str()) {
                    return Err(ReportError::Catalog(format!(
                        "variant `{}` in set `{name}` declares field `{}` twice",
                        decl.variant.name, field.name
                    )));
                }
            }

            match decl.field(assertion_field) {
                Some(spec) if spec.kind == ExtractorKind::Boolean => {}
                Some(spec) => {
                    return Err(ReportError::Catalog(format!(
                        "assertion field `{assertion_field}` of variant `{}` must be boolean, declared as {}",
                        decl.variant.name, spec.kind
                    )))
                }
                None => {
                    return Err(ReportError::Catalog(format!(
                        "variant `{}` in set `{name}` does not declare assertion field `{assertion_field}`",
                        decl.variant.name
                    )))
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            title: title.to_string(),
            output_stem: output_stem.to_string(),
            assertion_field: assertion_field.to_string(),
            variants,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// File name stem of the rendered artifact; renderers add the extension.
    pub fn output_stem(&self) -> &str {
        &self.output_stem
    }

    /// Semantic name of the boolean domain-assertion field.
    pub fn assertion_field(&self) -> &str {
        &self.assertion_field
    }

    /// Variants in declaration order.
    pub fn variants(&self) -> &[VariantDecl] {
        &self.variants
    }

    /// Every file this set needs, in declaration order.
    pub fn required_files(&self, root: &Path) -> Vec<PathBuf> {
        self.variants.iter().map(|v| v.resolve(root)).collect()
    }
}
