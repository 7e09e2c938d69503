//! Structured observability hooks for report runs.
//!
//! Lifecycle events are emitted at `info!` (skips at `warn!`) with an
//! `event` field so JSON log consumers can filter on them.

use std::path::Path;

use tracing::{info, warn};

use crate::availability::{MissingPolicy, SkippedSet};
use crate::catalog::ReportKind;

/// RAII guard that tags everything emitted during one report run.
pub struct ReportSpan {
    _span: tracing::span::EnteredSpan,
}

impl ReportSpan {
    /// Create and enter a span tagged with the report name.
    pub fn enter(report: ReportKind) -> Self {
        let span = tracing::info_span!("perfcmp.report", report = %report);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: report run started, with the effective missing-file policy.
pub fn emit_report_started(report: ReportKind, root: &Path, sets: usize, policy: MissingPolicy) {
    info!(
        event = "report.started",
        report = %report,
        root = %root.display(),
        sets = sets,
        policy = %policy,
    );
}

/// Emit event: set dropped under the lenient policy, at `warn!` level.
pub fn emit_set_skipped(skipped: &SkippedSet) {
    let missing: Vec<String> = skipped
        .missing
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    warn!(
        event = "set.skipped",
        set = %skipped.set,
        missing = ?missing,
        "{}",
        skipped.warning()
    );
}

/// Emit event: every row of a set validated, with its failed-assertion count.
pub fn emit_set_assembled(set: &str, rows: usize, failed: usize) {
    info!(
        event = "set.assembled",
        set = %set,
        rows = rows,
        failed = failed,
        all_passed = failed == 0,
    );
}

/// Emit event: chart artifact written.
pub fn emit_chart_rendered(set: &str, path: &Path) {
    info!(
        event = "chart.rendered",
        set = %set,
        path = %path.display(),
        "Plot saved: {}",
        path.display()
    );
}

/// Emit event: report run finished with rendered and skipped set counts.
pub fn emit_report_finished(report: ReportKind, rendered: usize, skipped: usize) {
    info!(
        event = "report.finished",
        report = %report,
        rendered = rendered,
        skipped = skipped,
    );
}
