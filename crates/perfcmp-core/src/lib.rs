//! perfcmp Core
//!
//! Turns loosely structured k6 result documents into validated comparison
//! models for chart rendering:
//! - [`document`]: dotted-path resolution with precise schema errors
//! - [`extract`]: strict number / integer / boolean / number-list contracts
//! - [`assemble`]: one row per declared variant, all-or-nothing
//! - [`availability`]: strict vs lenient handling of missing result files
//! - [`annotation`]: per-row pass/fail marks and the aggregate flag
//! - [`chart`] and [`render`]: the rendering boundary

pub mod annotation;
pub mod assemble;
pub mod availability;
pub mod catalog;
pub mod chart;
pub mod document;
pub mod domain;
pub mod error;
pub mod extract;
pub mod obs;
pub mod pipeline;
pub mod render;
pub mod stats;
pub mod telemetry;

pub use annotation::{annotate, AnnotationMark, Annotations};
pub use assemble::{assemble, extract_row};
pub use availability::{
    probe, resolve_availability, AvailabilityOutcome, AvailabilityPlan, MissingPolicy,
    SetAvailability, SetSelector, SkippedSet,
};
pub use catalog::ReportKind;
pub use chart::{build_chart, ChartModel, Panel};
pub use document::{FieldPath, ResultDocument};
pub use domain::{
    ComparisonSet, ExtractorKind, FieldSpec, MetricValue, Row, RowField, Variant, VariantDecl,
};
pub use error::{ReportError, Result};
pub use extract::{
    extract, extract_bool, extract_integer, extract_label, extract_number, extract_number_list,
};
pub use pipeline::{run_report, OutputTarget, RenderedChart, ReportOutcome, ReportRequest};
pub use render::{ChartRenderer, JsonChartRenderer, MarkdownChartRenderer};
pub use stats::median;
pub use telemetry::init_tracing;

/// perfcmp version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
