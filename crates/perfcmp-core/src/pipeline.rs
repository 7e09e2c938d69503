//! End-to-end report execution.
//!
//! validate arguments → select sets → probe availability → apply policy →
//! assemble → annotate → build chart → render, strictly in declaration order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::annotation::annotate;
use crate::assemble::assemble;
use crate::availability::{
    probe, resolve_availability, MissingPolicy, SetAvailability, SetSelector, SkippedSet,
};
use crate::catalog::ReportKind;
use crate::chart::build_chart;
use crate::domain::ComparisonSet;
use crate::error::{ReportError, Result};
use crate::obs::{
    emit_chart_rendered, emit_report_finished, emit_report_started, emit_set_assembled,
    emit_set_skipped, ReportSpan,
};
use crate::render::ChartRenderer;

/// Where rendered artifacts go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTarget {
    /// One artifact per set, named after the set's output stem.
    Directory(PathBuf),
    /// A single artifact; only valid when exactly one set is rendered.
    /// The extension is replaced by the renderer's own.
    File(PathBuf),
}

impl OutputTarget {
    fn stem_for(&self, set: &ComparisonSet) -> PathBuf {
        match self {
            OutputTarget::Directory(dir) => dir.join(set.output_stem()),
            OutputTarget::File(file) => file.with_extension(""),
        }
    }
}

/// Everything the boundary collects for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub kind: ReportKind,
    pub root: PathBuf,
    pub output: OutputTarget,
    /// Raw DPI as given; must be positive.
    pub dpi: i64,
    pub selector: SetSelector,
    /// `None` keeps the report's default policy.
    pub strict_missing: Option<bool>,
}

impl ReportRequest {
    pub fn new(kind: ReportKind, root: impl Into<PathBuf>, output: OutputTarget) -> Self {
        Self {
            kind,
            root: root.into(),
            output,
            dpi: 160,
            selector: SetSelector::All,
            strict_missing: None,
        }
    }

    pub fn with_dpi(mut self, dpi: i64) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_selector(mut self, selector: SetSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_strict_missing(mut self, strict_missing: bool) -> Self {
        self.strict_missing = Some(strict_missing);
        self
    }

    pub fn policy(&self) -> MissingPolicy {
        MissingPolicy::from_flag(self.strict_missing, self.kind.default_policy())
    }
}

/// One artifact written by the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedChart {
    pub set: String,
    pub path: PathBuf,
    pub all_passed: bool,
}

/// Outcome of a successful run: at least one chart rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub rendered: Vec<RenderedChart>,
    pub skipped: Vec<SkippedSet>,
}

/// Positive DPI as `u32`.
pub fn validate_dpi(dpi: i64) -> Result<u32> {
    u32::try_from(dpi)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| ReportError::InvalidArgument("--dpi must be a positive integer".to_string()))
}

/// Execute `request`, handing each finished chart to `renderer`.
///
/// # Errors
///
/// Any load, schema or type failure aborts the run, as do strict-policy
/// missing files and a run that renders nothing.
pub fn run_report(request: &ReportRequest, renderer: &dyn ChartRenderer) -> Result<ReportOutcome> {
    let _span = ReportSpan::enter(request.kind);

    let dpi = validate_dpi(request.dpi)?;
    if !request.root.is_dir() {
        return Err(ReportError::RootNotFound(request.root.clone()));
    }

    let sets = request.kind.select(&request.selector)?;
    if matches!(request.output, OutputTarget::File(_)) && sets.len() != 1 {
        return Err(ReportError::InvalidArgument(format!(
            "a single output file needs exactly one comparison set, {} selected",
            sets.len()
        )));
    }

    let policy = request.policy();
    emit_report_started(
        request.kind,
        &request.root,
        sets.len(),
        policy.effective(&request.selector),
    );

    let probes = probe_sets(&sets, &request.root);
    let plan = resolve_availability(&request.selector, policy, &probes)?;
    for skipped in &plan.skipped {
        emit_set_skipped(skipped);
    }

    // Nothing is written until every set has validated.
    let mut charts = Vec::new();
    for set in sets.iter().filter(|s| plan.renders(s.name())) {
        let rows = assemble(set, &request.root)?;
        let annotations = annotate(set, &rows)?;
        emit_set_assembled(set.name(), rows.len(), annotations.failed_count());
        charts.push((set, build_chart(request.kind, set, &rows, &annotations, dpi)?));
    }

    let mut rendered = Vec::new();
    for (set, chart) in &charts {
        let path = renderer.render(chart, &request.output.stem_for(set))?;
        emit_chart_rendered(set.name(), &path);
        rendered.push(RenderedChart {
            set: set.name().to_string(),
            path,
            all_passed: chart.all_passed,
        });
    }

    if rendered.is_empty() {
        return Err(ReportError::NoOutput);
    }

    emit_report_finished(request.kind, rendered.len(), plan.skipped.len());
    Ok(ReportOutcome {
        rendered,
        skipped: plan.skipped,
    })
}

fn probe_sets(sets: &[ComparisonSet], root: &Path) -> Vec<SetAvailability> {
    sets.iter()
        .map(|set| SetAvailability {
            set: set.name().to_string(),
            outcome: probe(set, root),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dpi() {
        assert_eq!(validate_dpi(160).unwrap(), 160);
        assert!(validate_dpi(0).is_err());
        assert!(validate_dpi(-5).is_err());
        assert!(validate_dpi(i64::MAX).is_err());
    }

    #[test]
    fn test_request_policy_defaults_per_report() {
        let out = OutputTarget::Directory(PathBuf::from("plots"));
        let student = ReportRequest::new(ReportKind::SingleStudent, "r", out.clone());
        assert_eq!(student.policy(), MissingPolicy::Lenient);
        assert_eq!(
            student.with_strict_missing(true).policy(),
            MissingPolicy::Strict
        );
        let single = ReportRequest::new(ReportKind::Single, "r", out);
        assert_eq!(single.policy(), MissingPolicy::Strict);
    }

    #[test]
    fn test_output_file_target_drops_extension() {
        let set = ReportKind::Repeatable.comparison_sets().unwrap().remove(0);
        let target = OutputTarget::File(PathBuf::from("plots/repeatable.png"));
        assert_eq!(target.stem_for(&set), PathBuf::from("plots/repeatable"));
        let dir = OutputTarget::Directory(PathBuf::from("plots"));
        assert_eq!(
            dir.stem_for(&set),
            PathBuf::from("plots/repeatable-rc-rr-atomic-vs-separated")
        );
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let request = ReportRequest::new(
            ReportKind::Single,
            "/definitely/not/a/real/root",
            OutputTarget::Directory(PathBuf::from("plots")),
        );
        let err = run_report(&request, &crate::render::JsonChartRenderer).unwrap_err();
        assert!(matches!(err, ReportError::RootNotFound(_)));
    }

    #[test]
    fn test_invalid_dpi_checked_first() {
        let request = ReportRequest::new(
            ReportKind::Single,
            "/definitely/not/a/real/root",
            OutputTarget::Directory(PathBuf::from("plots")),
        )
        .with_dpi(0);
        let err = run_report(&request, &crate::render::JsonChartRenderer).unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));
    }
}
