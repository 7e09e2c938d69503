//! Comparison-set assembly.
//!
//! Loads each variant's document in declaration order and runs the declared
//! extractors in declared field order. The first failure aborts the whole
//! set; rows are never partially built.

use std::path::Path;

use tracing::debug;

use crate::document::ResultDocument;
use crate::domain::{ComparisonSet, Row, RowField, VariantDecl};
use crate::error::Result;
use crate::extract::extract;

/// Build one row per variant, in declaration order.
///
/// Assumes availability has already been resolved; a file that disappears
/// in between surfaces as `ReportError::Load`.
pub fn assemble(set: &ComparisonSet, root: &Path) -> Result<Vec<Row>> {
    let mut rows = Vec::with_capacity(set.variants().len());
    for decl in set.variants() {
        let path = decl.resolve(root);
        debug!(set = %set.name(), variant = %decl.variant.name, file = %path.display(), "loading result document");
        let doc = ResultDocument::load(&path)?;
        rows.push(extract_row(&doc, decl)?);
    }
    Ok(rows)
}

/// Run every declared extractor for `decl` against `doc`.
pub fn extract_row(doc: &ResultDocument, decl: &VariantDecl) -> Result<Row> {
    let fields = decl
        .fields
        .iter()
        .map(|spec| {
            extract(doc, &spec.path, spec.kind).map(|value| RowField {
                name: spec.name.clone(),
                value,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Row::new(
        decl.variant.clone(),
        fields,
        doc.source().to_path_buf(),
        doc.digest().to_string(),
    ))
}
