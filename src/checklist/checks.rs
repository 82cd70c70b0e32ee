//! Static registry of checklist checks.
//!
//! Each check is a plain function over the statistics computed when the
//! checklist was built plus the record table. Checks never mutate anything,
//! so the registry order has no effect on verdicts. New checks are added by
//! appending to [`DEFAULT_CHECKS`] or passing a custom slice to
//! [`DbChecklist::run_checks`](crate::checklist::engine::DbChecklist::run_checks).

use serde::Serialize;

use crate::checklist::engine::ChecklistSummary;
use crate::core::member::ClusterTable;
use crate::core::types::Verdict;

/// Signature shared by all checks
pub type CheckFn = fn(&ChecklistSummary, &ClusterTable) -> CheckOutcome;

/// A named, registered check
#[derive(Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    /// Logged before the check runs
    pub description: &'static str,
    pub run: CheckFn,
}

/// What a check decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub verdict: Verdict,
    pub message: String,
    /// Issue line for the report, only for warnings
    pub issue: Option<String>,
}

impl CheckOutcome {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Pass,
            message: message.into(),
            issue: None,
        }
    }

    fn warn(message: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Warn,
            message: message.into(),
            issue: Some(issue.into()),
        }
    }

    fn skipped(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Skipped,
            message: message.into(),
            issue: None,
        }
    }
}

/// Result of one check in a checklist run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub verdict: Verdict,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

pub const DEFAULT_CHECKS: &[Check] = &[
    Check {
        name: "duplicate_ids",
        description: "duplicated sequence IDs",
        run: check_duplicate_ids,
    },
    Check {
        name: "overlapping_sequences",
        description: "partially or completely overlapping sequences",
        run: check_overlapping_sequences,
    },
    Check {
        name: "overlapping_distinct_categories",
        description: "partially and/or completely overlapping sequences with distinct categories",
        run: check_overlapping_distinct_categories,
    },
    Check {
        name: "clustered_all_records",
        description: "sequences missing from the clustering output",
        run: check_clustered_all_records,
    },
];

/// Two or more records share a sequence id
pub fn check_duplicate_ids(summary: &ChecklistSummary, _table: &ClusterTable) -> CheckOutcome {
    if summary.n_unique_sequences < summary.total_entries {
        CheckOutcome::warn(
            "Found possibly duplicated sequence IDs",
            "More than one sequence with same ID.",
        )
    } else {
        CheckOutcome::pass("Found no duplicate sequence IDs")
    }
}

/// Some cluster holds more than one sequence
pub fn check_overlapping_sequences(
    summary: &ChecklistSummary,
    _table: &ClusterTable,
) -> CheckOutcome {
    if summary.total_clusters < summary.total_entries {
        CheckOutcome::warn(
            "Found partially and/or completely overlapping sequences",
            "Partially and/or completely overlapping sequences.",
        )
    } else {
        CheckOutcome::pass("All sequences are unique")
    }
}

/// Some cluster mixes sequences from different categories
pub fn check_overlapping_distinct_categories(
    summary: &ChecklistSummary,
    _table: &ClusterTable,
) -> CheckOutcome {
    let Some(categories) = &summary.categories else {
        return CheckOutcome::skipped("No categories were extracted");
    };
    if categories.max_categories_per_cluster > 1 {
        CheckOutcome::warn(
            "Found partially and/or completely overlapping sequences with distinct categories",
            "Partially and/or completely overlapping sequences with distinct categories.",
        )
    } else {
        CheckOutcome::pass(
            "There were no partially and/or completely overlapping sequences with distinct categories",
        )
    }
}

/// The clustering output accounts for every record of the input database
pub fn check_clustered_all_records(
    summary: &ChecklistSummary,
    _table: &ClusterTable,
) -> CheckOutcome {
    let Some(input_records) = summary.input_records else {
        return CheckOutcome::skipped("Input record count unknown");
    };
    if input_records == summary.total_entries {
        CheckOutcome::pass(format!("All {input_records} input sequences were clustered"))
    } else {
        CheckOutcome::warn(
            format!(
                "Input has {input_records} sequences but clustering reported {}",
                summary.total_entries
            ),
            format!(
                "Clustering reported {} sequences but the database has {input_records}.",
                summary.total_entries
            ),
        )
    }
}
