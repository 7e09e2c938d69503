//! Rendering collaborators.
//!
//! A renderer receives a finished [`ChartModel`] and a target path stem and
//! writes one artifact, creating parent directories as needed. Raster
//! backends plug in behind [`ChartRenderer`]; the built-ins write a versioned
//! JSON chart artifact or a markdown summary.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::{ChartModel, Panel};
use crate::error::{ReportError, Result};

/// Schema version of [`ChartArtifact`].
pub const CHART_SCHEMA_VERSION: &str = "1.0";

/// Produces one output artifact per chart.
pub trait ChartRenderer {
    /// Render `chart` at `target_stem` plus a renderer-specific extension.
    fn render(&self, chart: &ChartModel, target_stem: &Path) -> Result<PathBuf>;
}

/// Persisted JSON form of a chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub chart: ChartModel,
}

/// Writes `<stem>.chart.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonChartRenderer;

impl ChartRenderer for JsonChartRenderer {
    fn render(&self, chart: &ChartModel, target_stem: &Path) -> Result<PathBuf> {
        let path = with_suffix(target_stem, ".chart.json");
        let artifact = ChartArtifact {
            schema_version: CHART_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            chart: chart.clone(),
        };
        let content = serde_json::to_string_pretty(&artifact)?;
        write_artifact(&path, &content)?;
        Ok(path)
    }
}

/// Writes `<stem>.md`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownChartRenderer;

impl ChartRenderer for MarkdownChartRenderer {
    fn render(&self, chart: &ChartModel, target_stem: &Path) -> Result<PathBuf> {
        let path = with_suffix(target_stem, ".md");
        write_artifact(&path, &render_chart_md(chart))?;
        Ok(path)
    }
}

/// Render a chart as markdown tables, one per panel.
pub fn render_chart_md(chart: &ChartModel) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", chart.title));
    for line in &chart.subtitle {
        out.push_str(&format!("{line}\n\n"));
    }
    out.push_str(&format!("- report: {}\n", chart.report));
    out.push_str(&format!("- set: {}\n", chart.set));
    out.push_str(&format!("- all passed: {}\n", chart.all_passed));
    out.push_str(&format!("- dpi: {}\n\n", chart.dpi));

    let labels: Vec<String> = chart
        .series
        .iter()
        .map(|s| {
            if s.failed {
                format!("{} [failed]", s.label)
            } else {
                s.label.clone()
            }
        })
        .collect();

    for panel in &chart.panels {
        match panel {
            Panel::Bars {
                title,
                unit,
                values,
                decimals,
                notes,
            } => {
                out.push_str(&format!("## {title}\n\n"));
                if notes.is_empty() {
                    out.push_str(&format!("| Series | {unit} |\n| --- | --- |\n"));
                } else {
                    out.push_str(&format!("| Series | {unit} | Note |\n| --- | --- | --- |\n"));
                }
                for (i, label) in labels.iter().enumerate() {
                    let value = fixed(values.get(i).copied(), *decimals);
                    match notes.get(i) {
                        Some(note) => {
                            out.push_str(&format!("| {label} | {value} | {note} |\n"));
                        }
                        None => {
                            out.push_str(&format!("| {label} | {value} |\n"));
                        }
                    }
                }
            }
            Panel::GroupedBars {
                title,
                unit,
                groups,
                decimals,
                ..
            } => {
                out.push_str(&format!("## {title} ({unit})\n\n"));
                let header: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
                out.push_str(&format!("| Series | {} |\n", header.join(" | ")));
                out.push_str(&format!("|{}\n", " --- |".repeat(groups.len() + 1)));
                for (i, label) in labels.iter().enumerate() {
                    let cells: Vec<String> = groups
                        .iter()
                        .map(|g| fixed(g.values.get(i).copied(), *decimals))
                        .collect();
                    out.push_str(&format!("| {label} | {} |\n", cells.join(" | ")));
                }
            }
            Panel::StackedBars {
                title,
                unit,
                segments,
            } => {
                out.push_str(&format!("## {title} ({unit})\n\n"));
                let header: Vec<&str> = segments.iter().map(|s| s.label.as_str()).collect();
                out.push_str(&format!("| Series | {} | Total |\n", header.join(" | ")));
                out.push_str(&format!("|{}\n", " --- |".repeat(segments.len() + 2)));
                for (i, label) in labels.iter().enumerate() {
                    let column: Vec<f64> = segments
                        .iter()
                        .map(|s| s.values.get(i).copied().unwrap_or_default())
                        .collect();
                    let cells: Vec<String> = column.iter().map(|v| fixed(Some(*v), 0)).collect();
                    let total: f64 = column.iter().sum();
                    out.push_str(&format!(
                        "| {label} | {} | {} |\n",
                        cells.join(" | "),
                        fixed(Some(total), 0)
                    ));
                }
            }
            Panel::BoxPlot {
                title,
                unit,
                distributions,
                medians,
                decimals,
            } => {
                out.push_str(&format!("## {title} ({unit})\n\n"));
                out.push_str("| Series | Median | Runs | Min | Max |\n| --- | --- | --- | --- | --- |\n");
                for (i, label) in labels.iter().enumerate() {
                    let samples = distributions.get(i).map(Vec::as_slice).unwrap_or_default();
                    let min = samples.iter().copied().reduce(f64::min);
                    let max = samples.iter().copied().reduce(f64::max);
                    out.push_str(&format!(
                        "| {label} | {} | {} | {} | {} |\n",
                        fixed(medians.get(i).copied(), *decimals),
                        samples.len(),
                        fixed(min, *decimals),
                        fixed(max, *decimals)
                    ));
                }
            }
        }
        out.push('\n');
    }

    if let Some(note) = &chart.legend_note {
        out.push_str(&format!("_{note}_\n\n"));
    }

    out.push_str("## Sources\n\n| Series | File | SHA-256 |\n| --- | --- | --- |\n");
    for source in &chart.sources {
        out.push_str(&format!(
            "| {} | `{}` | `{}` |\n",
            source.variant, source.path, source.sha256
        ));
    }
    out
}

fn fixed(value: Option<f64>, decimals: u8) -> String {
    match value {
        Some(v) => format!("{:.*}", usize::from(decimals), v),
        None => "-".to_string(),
    }
}

fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut raw = stem.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

fn write_artifact(path: &Path, content: &str) -> Result<()> {
    let render_err = |e: std::io::Error| ReportError::Render {
        target: path.to_path_buf(),
        reason: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(render_err)?;
    }
    std::fs::write(path, content).map_err(render_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReportKind;
    use crate::chart::{SeriesStyle, SourceRef, StackSegment};
    use tempfile::tempdir;

    fn sample_chart(failed: bool) -> ChartModel {
        ChartModel {
            report: ReportKind::Single,
            set: "read-committed".to_string(),
            title: "Single 4-Strategy Comparison - READ COMMITTED (allPass=True)".to_string(),
            subtitle: vec![],
            dpi: 160,
            series: vec![
                SeriesStyle {
                    label: "Atomic".to_string(),
                    color: "#E45756".to_string(),
                    failed,
                    group: None,
                },
                SeriesStyle {
                    label: "Separated".to_string(),
                    color: "#54A24B".to_string(),
                    failed: false,
                    group: None,
                },
            ],
            panels: vec![
                Panel::Bars {
                    title: "Latency p95 (ms)".to_string(),
                    unit: "ms".to_string(),
                    values: vec![11.0, 20.5],
                    decimals: 2,
                    notes: vec![],
                },
                Panel::StackedBars {
                    title: "Status Distribution".to_string(),
                    unit: "count".to_string(),
                    segments: vec![
                        StackSegment {
                            label: "201".to_string(),
                            color: "#54A24B".to_string(),
                            values: vec![90.0, 80.0],
                        },
                        StackSegment {
                            label: "409".to_string(),
                            color: "#E45756".to_string(),
                            values: vec![10.0, 20.0],
                        },
                    ],
                },
            ],
            all_passed: !failed,
            legend_note: failed.then(|| crate::chart::FAILURE_NOTE.to_string()),
            sources: vec![SourceRef {
                variant: "Atomic".to_string(),
                path: "rc-atomic.summary.json".to_string(),
                sha256: "abc".to_string(),
            }],
        }
    }

    #[test]
    fn test_json_renderer_writes_versioned_artifact() {
        let dir = tempdir().unwrap();
        let stem = dir.path().join("plots/nested/single-rc-4strategy");
        let path = JsonChartRenderer.render(&sample_chart(false), &stem).unwrap();

        assert_eq!(path, dir.path().join("plots/nested/single-rc-4strategy.chart.json"));
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["schema_version"], "1.0");
        assert!(raw.get("generated_at").is_some());
        assert_eq!(raw["chart"]["dpi"], 160);
        assert_eq!(raw["chart"]["panels"][0]["type"], "bars");
        assert_eq!(raw["chart"]["series"][0]["label"], "Atomic");
    }

    #[test]
    fn test_markdown_render_marks_failed_series() {
        let md = render_chart_md(&sample_chart(true));
        assert!(md.starts_with("# Single 4-Strategy Comparison"));
        assert!(md.contains("| Atomic [failed] | 11.00 |"));
        assert!(md.contains("| Separated | 20.50 |"));
        assert!(md.contains("| Atomic [failed] | 90 | 10 | 100 |"));
        assert!(md.contains(crate::chart::FAILURE_NOTE));
    }

    #[test]
    fn test_markdown_box_plot_and_sources_rows() {
        let mut chart = sample_chart(false);
        chart.panels = vec![Panel::BoxPlot {
            title: "Latency Comparison (p95)".to_string(),
            unit: "Latency (ms)".to_string(),
            distributions: vec![vec![10.0, 12.0, 11.0], vec![20.0, 19.0, 21.0]],
            medians: vec![11.0, 20.0],
            decimals: 1,
        }];
        let md = render_chart_md(&chart);
        assert!(md.contains("## Latency Comparison (p95) (Latency (ms))\n\n"));
        assert!(md.contains("| Atomic | 11.0 | 3 | 10.0 | 12.0 |\n"));
        assert!(md.contains("| Separated | 20.0 | 3 | 19.0 | 21.0 |\n"));
        assert!(md.ends_with("| Atomic | `rc-atomic.summary.json` | `abc` |\n"));
    }

    #[test]
    fn test_markdown_renderer_writes_md_file() {
        let dir = tempdir().unwrap();
        let path = MarkdownChartRenderer
            .render(&sample_chart(false), &dir.path().join("out"))
            .unwrap();
        assert_eq!(path, dir.path().join("out.md"));
        let md = std::fs::read_to_string(path).unwrap();
        assert!(!md.contains("[failed]"));
        assert!(md.contains("## Sources"));
    }
}
