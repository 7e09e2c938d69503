//! Renderer-neutral chart model.
//!
//! A [`ChartModel`] is the finished, rectangular data handed to a
//! [`ChartRenderer`](crate::render::ChartRenderer): every panel carries
//! exactly one value (or distribution) per series, in row order.

use serde::{Deserialize, Serialize};

use crate::annotation::Annotations;
use crate::catalog::{
    field, ReportKind, StackDef, ATOMIC, REPEATABLE_PROFILES, RULE_VIOLATION_STACK, SEPARATED,
    STATUS_STACK,
};
use crate::domain::{ComparisonSet, Row};
use crate::error::{ReportError, Result};
use crate::stats::median;

/// Legend note shown whenever at least one series failed its domain assertion.
pub const FAILURE_NOTE: &str = "red border + hatch = domainAssertions.pass=false";

/// Style of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStyle {
    pub label: String,
    pub color: String,
    /// Draw with the failure border.
    pub failed: bool,
    pub group: Option<String>,
}

/// Provenance of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub variant: String,
    pub path: String,
    pub sha256: String,
}

/// One group in a grouped bar panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarGroup {
    pub label: String,
    pub values: Vec<f64>,
    /// Rendered with reduced opacity.
    pub muted: bool,
}

/// One segment layer in a stacked bar panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSegment {
    pub label: String,
    pub color: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Panel {
    #[serde(rename_all = "camelCase")]
    Bars {
        title: String,
        unit: String,
        values: Vec<f64>,
        /// Decimal places of the value label above each bar.
        decimals: u8,
        /// Extra label per bar, e.g. success rate.
        notes: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    GroupedBars {
        title: String,
        unit: String,
        groups: Vec<BarGroup>,
        /// Group whose bars get value labels.
        labelled_group: Option<String>,
        decimals: u8,
    },
    #[serde(rename_all = "camelCase")]
    StackedBars {
        title: String,
        unit: String,
        segments: Vec<StackSegment>,
    },
    #[serde(rename_all = "camelCase")]
    BoxPlot {
        title: String,
        unit: String,
        distributions: Vec<Vec<f64>>,
        medians: Vec<f64>,
        decimals: u8,
    },
}

impl Panel {
    pub fn title(&self) -> &str {
        match self {
            Panel::Bars { title, .. }
            | Panel::GroupedBars { title, .. }
            | Panel::StackedBars { title, .. }
            | Panel::BoxPlot { title, .. } => title,
        }
    }
}

/// Everything a renderer needs for one comparison set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartModel {
    pub report: ReportKind,
    pub set: String,
    pub title: String,
    pub subtitle: Vec<String>,
    pub dpi: u32,
    pub series: Vec<SeriesStyle>,
    pub panels: Vec<Panel>,
    pub all_passed: bool,
    pub legend_note: Option<String>,
    pub sources: Vec<SourceRef>,
}

/// Build the chart for one assembled set.
pub fn build_chart(
    kind: ReportKind,
    set: &ComparisonSet,
    rows: &[Row],
    annotations: &Annotations,
    dpi: u32,
) -> Result<ChartModel> {
    if rows.len() != annotations.marks.len() {
        return Err(ReportError::Catalog(format!(
            "set `{}` has {} rows but {} annotation marks",
            set.name(),
            rows.len(),
            annotations.marks.len()
        )));
    }

    let (title, subtitle, panels) = match kind {
        ReportKind::Single => single_layout(set, rows, annotations)?,
        ReportKind::Repeatable => repeatable_layout(set, rows)?,
        ReportKind::SingleStudent => student_layout(set, rows, annotations)?,
    };

    let series = rows
        .iter()
        .map(|row| SeriesStyle {
            label: row.variant().name.clone(),
            color: row.variant().color.clone(),
            failed: annotations.is_failed(&row.variant().name),
            group: row.variant().group.clone(),
        })
        .collect();

    let sources = rows
        .iter()
        .map(|row| SourceRef {
            variant: row.variant().name.clone(),
            path: row.source().display().to_string(),
            sha256: row.source_digest().to_string(),
        })
        .collect();

    // The repeatable report reports stability per profile in its subtitle
    // instead of drawing failure borders.
    let legend_note = (kind != ReportKind::Repeatable && annotations.any_failed())
        .then(|| FAILURE_NOTE.to_string());

    Ok(ChartModel {
        report: kind,
        set: set.name().to_string(),
        title,
        subtitle,
        dpi,
        series,
        panels,
        all_passed: annotations.all_passed,
        legend_note,
        sources,
    })
}

type Layout = (String, Vec<String>, Vec<Panel>);

fn numbers(rows: &[Row], name: &str) -> Result<Vec<f64>> {
    rows.iter().map(|row| row.number(name)).collect()
}

fn single_layout(set: &ComparisonSet, rows: &[Row], annotations: &Annotations) -> Result<Layout> {
    let panels = vec![
        Panel::Bars {
            title: "Latency p95 (ms)".to_string(),
            unit: "ms".to_string(),
            values: numbers(rows, field::LATENCY_P95)?,
            decimals: 2,
            notes: Vec::new(),
        },
        Panel::Bars {
            title: "Throughput (req/s)".to_string(),
            unit: "req/s".to_string(),
            values: numbers(rows, field::THROUGHPUT)?,
            decimals: 2,
            notes: Vec::new(),
        },
    ];
    let title = format!(
        "Single 4-Strategy Comparison - {} (allPass={})",
        set.title(),
        py_bool(annotations.all_passed)
    );
    Ok((title, Vec::new(), panels))
}

fn repeatable_layout(set: &ComparisonSet, rows: &[Row]) -> Result<Layout> {
    let latency = rows
        .iter()
        .map(|row| row.number_list(field::LATENCY_P95).map(<[f64]>::to_vec))
        .collect::<Result<Vec<_>>>()?;
    let throughput = rows
        .iter()
        .map(|row| row.number_list(field::THROUGHPUT).map(<[f64]>::to_vec))
        .collect::<Result<Vec<_>>>()?;

    let panels = vec![
        box_plot("Latency Comparison (p95)", "Latency (ms)", latency)?,
        box_plot("Throughput Comparison", "Throughput (req/s)", throughput)?,
    ];

    let summaries = REPEATABLE_PROFILES
        .iter()
        .map(|tag| profile_summary(rows, tag.profile, tag.short))
        .collect::<Result<Vec<_>>>()?;

    Ok((set.title().to_string(), vec![summaries.join(" | ")], panels))
}

fn box_plot(title: &str, unit: &str, distributions: Vec<Vec<f64>>) -> Result<Panel> {
    let medians = distributions
        .iter()
        .map(|d| {
            median(d).ok_or_else(|| {
                ReportError::Catalog(format!("panel `{title}` received an empty distribution"))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Panel::BoxPlot {
        title: title.to_string(),
        unit: unit.to_string(),
        distributions,
        medians,
        decimals: 1,
    })
}

/// `RC(runs=3, atomic=PASS, separated=FAIL)` for one isolation profile.
///
/// Run counts that differ between the two scenarios print as `mixed`.
pub fn profile_summary(rows: &[Row], profile: &str, short: &str) -> Result<String> {
    let profile_rows: Vec<&Row> = rows
        .iter()
        .filter(|row| row.variant().group.as_deref() == Some(profile))
        .collect();
    if profile_rows.len() != 2 {
        return Err(ReportError::Catalog(format!(
            "expected 2 scenarios for profile {profile}, found {}",
            profile_rows.len()
        )));
    }

    let mut run_counts = profile_rows
        .iter()
        .map(|row| row.integer(field::RUN_COUNT))
        .collect::<Result<Vec<_>>>()?;
    run_counts.sort_unstable();
    run_counts.dedup();
    let runs = match run_counts.as_slice() {
        [only] => only.to_string(),
        _ => "mixed".to_string(),
    };

    let state = |strategy: &str| -> Result<&'static str> {
        let row = profile_rows
            .iter()
            .find(|row| row.variant().strategy == strategy)
            .ok_or_else(|| {
                ReportError::Catalog(format!("profile {profile} has no {strategy} scenario"))
            })?;
        Ok(if row.flag(field::PASSED)? { "PASS" } else { "FAIL" })
    };

    Ok(format!(
        "{short}(runs={runs}, atomic={}, separated={})",
        state(ATOMIC)?,
        state(SEPARATED)?
    ))
}

fn student_layout(set: &ComparisonSet, rows: &[Row], annotations: &Annotations) -> Result<Layout> {
    let success_notes = rows
        .iter()
        .map(|row| {
            row.number(field::SUCCESS_RATE)
                .map(|rate| format!("SR={:.1}%", rate * 100.0))
        })
        .collect::<Result<Vec<_>>>()?;

    let panels = vec![
        Panel::GroupedBars {
            title: "Latency Comparison".to_string(),
            unit: "ms".to_string(),
            groups: vec![
                BarGroup {
                    label: "avg".to_string(),
                    values: numbers(rows, field::LATENCY_AVG)?,
                    muted: true,
                },
                BarGroup {
                    label: "p95".to_string(),
                    values: numbers(rows, field::LATENCY_P95)?,
                    muted: false,
                },
            ],
            labelled_group: Some("p95".to_string()),
            decimals: 2,
        },
        Panel::Bars {
            title: "Throughput + SuccessRate".to_string(),
            unit: "req/s".to_string(),
            values: numbers(rows, field::THROUGHPUT)?,
            decimals: 2,
            notes: success_notes,
        },
        stacked("Status Distribution", rows, STATUS_STACK)?,
        stacked("422 Breakdown", rows, RULE_VIOLATION_STACK)?,
    ];

    let title = format!("{} (allPass={})", set.title(), py_bool(annotations.all_passed));
    let scenarios = rows
        .iter()
        .map(|row| {
            row.label(field::SCENARIO)
                .map(|scenario| format!("{}={}", row.variant().name, scenario))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((title, vec![scenarios.join(" | ")], panels))
}

fn stacked(title: &str, rows: &[Row], stack: &[StackDef]) -> Result<Panel> {
    let segments = stack
        .iter()
        .map(|def| {
            Ok(StackSegment {
                label: def.label.to_string(),
                color: def.color.to_string(),
                values: numbers(rows, def.field)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Panel::StackedBars {
        title: title.to_string(),
        unit: "count".to_string(),
        segments,
    })
}

// Capitalised booleans, as in the published chart titles.
fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
