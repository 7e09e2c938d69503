//! Pass/fail overlay for assembled rows.
//!
//! The domain-assertion boolean is taken verbatim from each row; nothing is
//! thresholded here. Rows are never modified.

use serde::{Deserialize, Serialize};

use crate::domain::{ComparisonSet, Row};
use crate::error::Result;

/// Failure marker for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationMark {
    pub variant: String,
    pub failed: bool,
}

/// Per-row marks plus the aggregate flag, in row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    pub marks: Vec<AnnotationMark>,
    pub all_passed: bool,
}

impl Annotations {
    pub fn any_failed(&self) -> bool {
        !self.all_passed
    }

    pub fn is_failed(&self, variant: &str) -> bool {
        self.marks
            .iter()
            .any(|m| m.variant == variant && m.failed)
    }

    pub fn failed_count(&self) -> usize {
        self.marks.iter().filter(|m| m.failed).count()
    }
}

/// Read `set`'s assertion field from every row.
pub fn annotate(set: &ComparisonSet, rows: &[Row]) -> Result<Annotations> {
    let marks = rows
        .iter()
        .map(|row| {
            row.flag(set.assertion_field()).map(|passed| AnnotationMark {
                variant: row.variant().name.clone(),
                failed: !passed,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let all_passed = marks.iter().all(|m| !m.failed);
    Ok(Annotations { marks, all_passed })
}
