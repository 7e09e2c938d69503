//! Static comparison-set declarations for the three k6 reports.
//!
//! - `single`: four concurrency strategies per isolation profile
//! - `repeatable`: atomic vs separated aggregates across RC and RR
//! - `single-student`: atomic vs separated for one student, spread and conflict workloads

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::availability::{MissingPolicy, SetSelector};
use crate::domain::{ComparisonSet, ExtractorKind, FieldSpec, Variant, VariantDecl};
use crate::error::{ReportError, Result};

/// Semantic row field names shared by the catalog and chart builders.
pub mod field {
    pub const SCENARIO: &str = "scenario";
    pub const LATENCY_P95: &str = "latencyP95";
    pub const LATENCY_AVG: &str = "latencyAvg";
    pub const THROUGHPUT: &str = "throughput";
    pub const SUCCESS_RATE: &str = "successRate";
    pub const RUN_COUNT: &str = "runCount";
    pub const PASSED: &str = "passed";
    pub const STATUS_201: &str = "status201";
    pub const STATUS_409: &str = "status409";
    pub const STATUS_422: &str = "status422";
    pub const UNEXPECTED: &str = "unexpected";
    pub const SCHEDULE_CONFLICT_422: &str = "scheduleConflict422";
    pub const CREDIT_LIMIT_422: &str = "creditLimit422";
    pub const CAPACITY_422: &str = "capacity422";
    pub const OTHER_422: &str = "other422";
}

struct StrategyDef {
    key: &'static str,
    label: &'static str,
    color: &'static str,
}

struct ProfileDef {
    name: &'static str,
    prefix: &'static str,
    title: &'static str,
    output_stem: &'static str,
}

struct ScenarioDef {
    label: &'static str,
    strategy: &'static str,
    profile: &'static str,
    scenario: &'static str,
}

struct StudentSetDef {
    name: &'static str,
    title: &'static str,
    output_stem: &'static str,
    files: &'static [(&'static str, &'static str)],
}

/// Segment of a stacked bar: row field, legend label, color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackDef {
    pub field: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

/// Isolation profile with its short suptitle name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileTag {
    pub profile: &'static str,
    pub short: &'static str,
}

pub const ATOMIC: &str = "atomic";
pub const SEPARATED: &str = "separated";

const SINGLE_STRATEGIES: &[StrategyDef] = &[
    StrategyDef { key: "optimistic", label: "Optimistic", color: "#4C78A8" },
    StrategyDef { key: "pessimistic", label: "Pessimistic", color: "#F58518" },
    StrategyDef { key: SEPARATED, label: "Separated", color: "#54A24B" },
    StrategyDef { key: ATOMIC, label: "Atomic", color: "#E45756" },
];

const SINGLE_PROFILES: &[ProfileDef] = &[
    ProfileDef {
        name: "read-committed",
        prefix: "rc",
        title: "READ COMMITTED",
        output_stem: "single-rc-4strategy",
    },
    ProfileDef {
        name: "repeatable-read",
        prefix: "rr",
        title: "REPEATABLE READ",
        output_stem: "single-rr-4strategy",
    },
];

const REPEATABLE_SET: &str = "rc-rr-atomic-vs-separated";
const REPEATABLE_COLORS: &[(&str, &str)] = &[(ATOMIC, "#4C78A8"), (SEPARATED, "#F58518")];

const REPEATABLE_SCENARIOS: &[ScenarioDef] = &[
    ScenarioDef {
        label: "RC Atomic",
        strategy: ATOMIC,
        profile: "read-committed",
        scenario: "rc-atomic-multi",
    },
    ScenarioDef {
        label: "RC Separated",
        strategy: SEPARATED,
        profile: "read-committed",
        scenario: "rc-separated-multi",
    },
    ScenarioDef {
        label: "RR Atomic",
        strategy: ATOMIC,
        profile: "repeatable-read",
        scenario: "rr-atomic-multi",
    },
    ScenarioDef {
        label: "RR Separated",
        strategy: SEPARATED,
        profile: "repeatable-read",
        scenario: "rr-separated-multi",
    },
];

/// Profiles summarised in the repeatable report's suptitle, in order.
pub const REPEATABLE_PROFILES: &[ProfileTag] = &[
    ProfileTag { profile: "read-committed", short: "RC" },
    ProfileTag { profile: "repeatable-read", short: "RR" },
];

const STUDENT_STRATEGIES: &[StrategyDef] = &[
    StrategyDef { key: ATOMIC, label: "Atomic", color: "#4C78A8" },
    StrategyDef { key: SEPARATED, label: "Separated", color: "#F58518" },
];

const STUDENT_SETS: &[StudentSetDef] = &[
    StudentSetDef {
        name: "spread",
        title: "RC Single Student Multi-Course (Spread)",
        output_stem: "single-student-rc-spread-atomic-vs-separated",
        files: &[
            (ATOMIC, "rc-atomic-single-student-multi.summary.json"),
            (SEPARATED, "rc-separated-single-student-multi.summary.json"),
        ],
    },
    StudentSetDef {
        name: "conflict",
        title: "RC Single Student Multi-Course (Conflict)",
        output_stem: "single-student-rc-conflict-atomic-vs-separated",
        files: &[
            (ATOMIC, "rc-atomic-single-student-conflict.summary.json"),
            (SEPARATED, "rc-separated-single-student-conflict.summary.json"),
        ],
    },
];

/// HTTP status distribution, bottom to top.
pub const STATUS_STACK: &[StackDef] = &[
    StackDef { field: field::STATUS_201, label: "201", color: "#54A24B" },
    StackDef { field: field::STATUS_409, label: "409", color: "#E45756" },
    StackDef { field: field::STATUS_422, label: "422", color: "#B279A2" },
];

/// 422 rule-violation breakdown, bottom to top.
pub const RULE_VIOLATION_STACK: &[StackDef] = &[
    StackDef { field: field::SCHEDULE_CONFLICT_422, label: "Schedule", color: "#EECA3B" },
    StackDef { field: field::CREDIT_LIMIT_422, label: "CreditLimit", color: "#72B7B2" },
    StackDef { field: field::CAPACITY_422, label: "Capacity", color: "#FF9DA6" },
    StackDef { field: field::OTHER_422, label: "Other", color: "#9D755D" },
];

/// The three report families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Single,
    Repeatable,
    SingleStudent,
}

impl ReportKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Single => "single",
            ReportKind::Repeatable => "repeatable",
            ReportKind::SingleStudent => "single-student",
        }
    }

    /// Policy used when the caller does not pass `--strict-missing`.
    pub fn default_policy(&self) -> MissingPolicy {
        match self {
            ReportKind::Single | ReportKind::Repeatable => MissingPolicy::Strict,
            ReportKind::SingleStudent => MissingPolicy::Lenient,
        }
    }

    /// Declared set names, in rendering order.
    pub fn set_names(&self) -> Vec<&'static str> {
        match self {
            ReportKind::Single => SINGLE_PROFILES.iter().map(|p| p.name).collect(),
            ReportKind::Repeatable => vec![REPEATABLE_SET],
            ReportKind::SingleStudent => STUDENT_SETS.iter().map(|s| s.name).collect(),
        }
    }

    /// Build every declared set.
    pub fn comparison_sets(&self) -> Result<Vec<ComparisonSet>> {
        match self {
            ReportKind::Single => SINGLE_PROFILES.iter().map(single_set).collect(),
            ReportKind::Repeatable => Ok(vec![repeatable_set()?]),
            ReportKind::SingleStudent => STUDENT_SETS.iter().map(student_set).collect(),
        }
    }

    /// Sets chosen by `selector`, in declaration order.
    ///
    /// # Errors
    ///
    /// `ReportError::UnknownSet` when a named set is not declared.
    pub fn select(&self, selector: &SetSelector) -> Result<Vec<ComparisonSet>> {
        let sets = self.comparison_sets()?;
        match selector {
            SetSelector::All => Ok(sets),
            SetSelector::Named(name) => {
                let chosen: Vec<_> = sets.into_iter().filter(|s| s.name() == name).collect();
                if chosen.is_empty() {
                    return Err(ReportError::UnknownSet {
                        report: self.name().to_string(),
                        set: name.clone(),
                    });
                }
                Ok(chosen)
            }
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn summary_fields(specs: &[(&str, &str, ExtractorKind)]) -> Result<Vec<FieldSpec>> {
    specs
        .iter()
        .map(|(name, path, kind)| FieldSpec::new(name, path, *kind))
        .collect()
}

fn single_set(profile: &ProfileDef) -> Result<ComparisonSet> {
    use ExtractorKind::{Boolean, Label, Number};
    let fields = summary_fields(&[
        (field::SCENARIO, "scenario", Label),
        (field::LATENCY_P95, "latencyMs.p95", Number),
        (field::LATENCY_AVG, "latencyMs.avg", Number),
        (field::THROUGHPUT, "throughputRps", Number),
        (field::SUCCESS_RATE, "ratios.successRate", Number),
        (field::PASSED, "domainAssertions.pass", Boolean),
    ])?;

    let variants = SINGLE_STRATEGIES
        .iter()
        .map(|s| {
            VariantDecl::new(
                Variant::new(s.label, s.key, s.color).in_group(profile.name),
                format!("{}-{}.summary.json", profile.prefix, s.key),
                fields.clone(),
            )
        })
        .collect();

    ComparisonSet::new(
        profile.name,
        profile.title,
        profile.output_stem,
        field::PASSED,
        variants,
    )
}

fn repeatable_set() -> Result<ComparisonSet> {
    use ExtractorKind::{Boolean, Integer, NumberList};
    let fields = summary_fields(&[
        (field::LATENCY_P95, "metrics.latencyMsP95.values", NumberList),
        (field::THROUGHPUT, "metrics.throughputRps.values", NumberList),
        (field::RUN_COUNT, "input.runCount", Integer),
        (field::PASSED, "stability.pass", Boolean),
    ])?;

    let variants = REPEATABLE_SCENARIOS
        .iter()
        .map(|s| {
            let color = REPEATABLE_COLORS
                .iter()
                .find(|(strategy, _)| *strategy == s.strategy)
                .map(|(_, color)| *color)
                .ok_or_else(|| {
                    ReportError::Catalog(format!("no color declared for strategy `{}`", s.strategy))
                })?;
            Ok(VariantDecl::new(
                Variant::new(s.label, s.strategy, color).in_group(s.profile),
                format!("{}/{}.aggregate.json", s.profile, s.scenario),
                fields.clone(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    ComparisonSet::new(
        REPEATABLE_SET,
        "Repeatable Atomic vs Separated (RC + RR)",
        "repeatable-rc-rr-atomic-vs-separated",
        field::PASSED,
        variants,
    )
}

fn student_set(def: &StudentSetDef) -> Result<ComparisonSet> {
    use ExtractorKind::{Boolean, Label, Number};
    let fields = summary_fields(&[
        (field::SCENARIO, "scenario", Label),
        (field::LATENCY_AVG, "latencyMs.avg", Number),
        (field::LATENCY_P95, "latencyMs.p95", Number),
        (field::THROUGHPUT, "throughputRps", Number),
        (field::SUCCESS_RATE, "ratios.successRate", Number),
        (field::STATUS_201, "totals.status201", Number),
        (field::STATUS_409, "totals.status409", Number),
        (field::STATUS_422, "totals.status422", Number),
        (field::UNEXPECTED, "totals.unexpected", Number),
        (field::SCHEDULE_CONFLICT_422, "errorCodes.scheduleConflict422", Number),
        (field::CREDIT_LIMIT_422, "errorCodes.creditLimit422", Number),
        (field::CAPACITY_422, "errorCodes.capacity422", Number),
        (field::OTHER_422, "errorCodes.other422", Number),
        (field::PASSED, "domainAssertions.pass", Boolean),
    ])?;

    let variants = STUDENT_STRATEGIES
        .iter()
        .map(|s| {
            let file = def
                .files
                .iter()
                .find(|(key, _)| *key == s.key)
                .map(|(_, file)| *file)
                .ok_or_else(|| {
                    ReportError::Catalog(format!(
                        "set `{}` declares no file for strategy `{}`",
                        def.name, s.key
                    ))
                })?;
            Ok(VariantDecl::new(
                Variant::new(s.label, s.key, s.color),
                file,
                fields.clone(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    ComparisonSet::new(def.name, def.title, def.output_stem, field::PASSED, variants)
}
