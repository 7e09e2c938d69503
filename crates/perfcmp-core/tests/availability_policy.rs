//! Strict/lenient handling of missing result files against real directories.

use std::fs;
use std::path::Path;

use perfcmp_core::{
    probe, resolve_availability, AvailabilityOutcome, MissingPolicy, ReportError, ReportKind,
    SetAvailability, SetSelector,
};
use tempfile::TempDir;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "{}").unwrap();
}

fn probes(kind: ReportKind, root: &Path) -> Vec<SetAvailability> {
    kind.comparison_sets()
        .unwrap()
        .iter()
        .map(|set| SetAvailability {
            set: set.name().to_string(),
            outcome: probe(set, root),
        })
        .collect()
}

#[test]
fn strict_policy_aborts_on_one_missing_variant() {
    let dir = TempDir::new().unwrap();
    for strategy in ["optimistic", "pessimistic", "separated"] {
        touch(dir.path(), &format!("rc-{strategy}.summary.json"));
    }

    let sets = ReportKind::Single.comparison_sets().unwrap();
    match probe(&sets[0], dir.path()) {
        AvailabilityOutcome::Incomplete { missing } => {
            assert_eq!(missing, vec![dir.path().join("rc-atomic.summary.json")]);
        }
        other => panic!("expected incomplete set, got {other:?}"),
    }

    let err = resolve_availability(
        &SetSelector::All,
        MissingPolicy::Strict,
        &probes(ReportKind::Single, dir.path()),
    )
    .unwrap_err();
    match err {
        ReportError::PolicyAbort { set, missing } => {
            assert_eq!(set, "read-committed");
            assert_eq!(missing.len(), 1);
        }
        other => panic!("expected policy abort, got {other:?}"),
    }
}

#[test]
fn lenient_policy_skips_incomplete_sets() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "rc-atomic-single-student-conflict.summary.json");
    touch(dir.path(), "rc-separated-single-student-conflict.summary.json");
    touch(dir.path(), "rc-atomic-single-student-multi.summary.json");

    let plan = resolve_availability(
        &SetSelector::All,
        MissingPolicy::Lenient,
        &probes(ReportKind::SingleStudent, dir.path()),
    )
    .unwrap();

    assert_eq!(plan.render, vec!["conflict".to_string()]);
    assert_eq!(plan.skipped.len(), 1);
    assert_eq!(plan.skipped[0].set, "spread");
    let warnings = plan.warnings();
    assert!(warnings[0].contains("rc-separated-single-student-multi.summary.json"));
}

#[test]
fn named_set_escalates_lenient_to_strict() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "rc-atomic-single-student-multi.summary.json");

    let selector = SetSelector::Named("spread".to_string());
    let chosen = ReportKind::SingleStudent.select(&selector).unwrap();
    let probes: Vec<_> = chosen
        .iter()
        .map(|set| SetAvailability {
            set: set.name().to_string(),
            outcome: probe(set, dir.path()),
        })
        .collect();

    let err = resolve_availability(&selector, MissingPolicy::Lenient, &probes).unwrap_err();
    assert!(matches!(err, ReportError::PolicyAbort { ref set, .. } if set == "spread"));
}

#[test]
fn lenient_policy_with_nothing_complete_yields_no_output() {
    let dir = TempDir::new().unwrap();
    let err = resolve_availability(
        &SetSelector::All,
        MissingPolicy::Lenient,
        &probes(ReportKind::SingleStudent, dir.path()),
    )
    .unwrap_err();
    assert!(matches!(err, ReportError::NoOutput));
}
