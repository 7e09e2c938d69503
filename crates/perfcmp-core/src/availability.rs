//! Missing-file policy for comparison sets.
//!
//! Availability is probed for every requested set before any document is
//! parsed; [`resolve_availability`] then decides, as a pure function, which
//! sets render, which are skipped with a warning, and whether the run aborts.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::ComparisonSet;
use crate::error::{ReportError, Result};

/// How a set with missing files is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Any missing file aborts the run.
    Strict,
    /// A set with missing files is skipped with a warning.
    Lenient,
}

impl MissingPolicy {
    /// `--strict-missing` as a native boolean; `None` keeps `default`.
    pub fn from_flag(strict_missing: Option<bool>, default: MissingPolicy) -> Self {
        match strict_missing {
            Some(true) => MissingPolicy::Strict,
            Some(false) => MissingPolicy::Lenient,
            None => default,
        }
    }

    /// A single explicitly named set has nothing to fall back to, so leniency
    /// only applies when iterating over all sets.
    pub fn effective(self, selector: &SetSelector) -> Self {
        match selector {
            SetSelector::All => self,
            SetSelector::Named(_) => MissingPolicy::Strict,
        }
    }
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingPolicy::Strict => f.write_str("strict"),
            MissingPolicy::Lenient => f.write_str("lenient"),
        }
    }
}

/// Which sets of a report the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetSelector {
    All,
    Named(String),
}

impl SetSelector {
    /// `all` selects every set; anything else names one.
    pub fn parse(raw: &str) -> Self {
        if raw == "all" {
            SetSelector::All
        } else {
            SetSelector::Named(raw.to_string())
        }
    }
}

/// Whether every file a set needs exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AvailabilityOutcome {
    Complete,
    Incomplete { missing: Vec<PathBuf> },
}

/// Availability of one named set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAvailability {
    pub set: String,
    pub outcome: AvailabilityOutcome,
}

/// A set dropped under the lenient policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSet {
    pub set: String,
    pub missing: Vec<PathBuf>,
}

impl SkippedSet {
    pub fn warning(&self) -> String {
        format!(
            "Skipping set `{}` due to missing files: {}",
            self.set,
            crate::error::join_paths(&self.missing)
        )
    }
}

/// Decision reached by [`resolve_availability`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityPlan {
    /// Sets to assemble, in caller order.
    pub render: Vec<String>,
    pub skipped: Vec<SkippedSet>,
}

impl AvailabilityPlan {
    pub fn renders(&self, set: &str) -> bool {
        self.render.iter().any(|s| s == set)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.skipped.iter().map(SkippedSet::warning).collect()
    }
}

/// Check which of `set`'s files exist under `root`.
pub fn probe(set: &ComparisonSet, root: &Path) -> AvailabilityOutcome {
    let missing: Vec<PathBuf> = set
        .required_files(root)
        .into_iter()
        .filter(|p| !p.is_file())
        .collect();
    if missing.is_empty() {
        AvailabilityOutcome::Complete
    } else {
        AvailabilityOutcome::Incomplete { missing }
    }
}

/// Apply `policy` to the probed sets.
///
/// # Errors
///
/// - `ReportError::PolicyAbort` for the first incomplete set when the
///   effective policy is strict
/// - `ReportError::NoOutput` when no set is left to render
pub fn resolve_availability(
    selector: &SetSelector,
    policy: MissingPolicy,
    probes: &[SetAvailability],
) -> Result<AvailabilityPlan> {
    let policy = policy.effective(selector);
    let mut plan = AvailabilityPlan::default();

    for probe in probes {
        match &probe.outcome {
            AvailabilityOutcome::Complete => plan.render.push(probe.set.clone()),
            AvailabilityOutcome::Incomplete { missing } => match policy {
                MissingPolicy::Strict => {
                    return Err(ReportError::PolicyAbort {
                        set: probe.set.clone(),
                        missing: missing.clone(),
                    })
                }
                MissingPolicy::Lenient => plan.skipped.push(SkippedSet {
                    set: probe.set.clone(),
                    missing: missing.clone(),
                }),
            },
        }
    }

    if plan.render.is_empty() {
        return Err(ReportError::NoOutput);
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(set: &str) -> SetAvailability {
        SetAvailability {
            set: set.to_string(),
            outcome: AvailabilityOutcome::Complete,
        }
    }

    fn incomplete(set: &str, missing: &[&str]) -> SetAvailability {
        SetAvailability {
            set: set.to_string(),
            outcome: AvailabilityOutcome::Incomplete {
                missing: missing.iter().map(PathBuf::from).collect(),
            },
        }
    }

    #[test]
    fn test_all_complete_renders_everything_in_order() {
        let plan = resolve_availability(
            &SetSelector::All,
            MissingPolicy::Lenient,
            &[complete("spread"), complete("conflict")],
        )
        .unwrap();
        assert_eq!(plan.render, vec!["spread", "conflict"]);
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_strict_aborts_and_lists_every_missing_path() {
        let err = resolve_availability(
            &SetSelector::All,
            MissingPolicy::Strict,
            &[complete("spread"), incomplete("conflict", &["a.json", "b.json"])],
        )
        .unwrap_err();
        match err {
            ReportError::PolicyAbort { set, missing } => {
                assert_eq!(set, "conflict");
                assert_eq!(missing.len(), 2);
            }
            other => panic!("Expected PolicyAbort, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_all_skips_incomplete_set() {
        let plan = resolve_availability(
            &SetSelector::All,
            MissingPolicy::Lenient,
            &[incomplete("spread", &["x.json"]), complete("conflict")],
        )
        .unwrap();
        assert_eq!(plan.render, vec!["conflict"]);
        assert_eq!(plan.skipped.len(), 1);
        assert!(plan.warnings()[0].contains("Skipping set `spread`"));
        assert!(plan.warnings()[0].contains("x.json"));
    }

    #[test]
    fn test_lenient_named_target_escalates_to_strict() {
        let err = resolve_availability(
            &SetSelector::Named("spread".to_string()),
            MissingPolicy::Lenient,
            &[incomplete("spread", &["x.json"])],
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::PolicyAbort { .. }));
    }

    #[test]
    fn test_nothing_left_to_render_is_no_output() {
        let err = resolve_availability(
            &SetSelector::All,
            MissingPolicy::Lenient,
            &[incomplete("spread", &["x.json"]), incomplete("conflict", &["y.json"])],
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::NoOutput));
    }

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(
            MissingPolicy::from_flag(None, MissingPolicy::Lenient),
            MissingPolicy::Lenient
        );
        assert_eq!(
            MissingPolicy::from_flag(Some(true), MissingPolicy::Lenient),
            MissingPolicy::Strict
        );
        assert_eq!(
            MissingPolicy::from_flag(Some(false), MissingPolicy::Strict),
            MissingPolicy::Lenient
        );
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(SetSelector::parse("all"), SetSelector::All);
        assert_eq!(
            SetSelector::parse("spread"),
            SetSelector::Named("spread".to_string())
        );
    }
}
