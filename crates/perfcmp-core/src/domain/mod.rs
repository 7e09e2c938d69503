//! Domain model for comparison reports.
//!
//! - [`ComparisonSet`]: the statically declared group of variants rendered together
//! - [`VariantDecl`]: one variant, its source file and its required fields
//! - [`Row`]: the fully validated per-variant extraction result
//! - [`MetricValue`]: a typed value pulled out of a result document

pub mod comparison;
pub mod row;

pub use comparison::{ComparisonSet, ExtractorKind, FieldSpec, Variant, VariantDecl};
pub use row::{MetricValue, Row, RowField};
