use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::checklist::checks::{Check, CheckResult, DEFAULT_CHECKS};
use crate::checklist::distribution::Distribution;
use crate::core::member::{ClusterGroup, ClusterMember, ClusterTable};
use crate::core::types::Verdict;

/// Category statistics, present only when categories were extracted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    /// Distinct non-empty categories across the whole table
    pub n_unique_categories: usize,

    /// Largest number of distinct categories in a single cluster
    pub max_categories_per_cluster: usize,

    /// Distribution of distinct-category counts per cluster
    pub categories_by_cluster_distribution: Distribution,
}

/// Aggregate statistics computed once when the checklist is built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistSummary {
    pub total_entries: usize,
    pub total_clusters: usize,
    pub n_unique_sequences: usize,
    pub cluster_size_distribution: Distribution,

    #[serde(flatten)]
    pub categories: Option<CategoryStats>,

    /// Records in the input database, when it was read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_records: Option<usize>,
}

impl ChecklistSummary {
    #[must_use]
    pub fn compute(table: &ClusterTable) -> Self {
        let clusters = table.clusters();

        let n_unique_sequences = table
            .members
            .iter()
            .map(|m| m.sequence_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let cluster_size_distribution = Distribution::from_counts(clusters.iter().map(ClusterGroup::size));

        let categories = table.has_categories().then(|| {
            let n_unique_categories = table
                .members
                .iter()
                .filter_map(|m| m.category.as_deref())
                .collect::<HashSet<_>>()
                .len();
            let per_cluster: Vec<usize> = clusters
                .iter()
                .map(ClusterGroup::distinct_categories)
                .collect();

            CategoryStats {
                n_unique_categories,
                max_categories_per_cluster: per_cluster.iter().copied().max().unwrap_or(0),
                categories_by_cluster_distribution: Distribution::from_counts(per_cluster),
            }
        });

        Self {
            total_entries: table.len(),
            total_clusters: clusters.len(),
            n_unique_sequences,
            cluster_size_distribution,
            categories,
            input_records: None,
        }
    }
}

/// Checklist over one clustered database
///
/// Statistics are computed eagerly in [`DbChecklist::new`]; [`DbChecklist::ticks`]
/// then runs the registered checks and collects their issues.
#[derive(Debug, Clone)]
pub struct DbChecklist {
    pub author: String,
    pub db_name: String,
    pub table: ClusterTable,
    pub summary: ChecklistSummary,
    pub results: Vec<CheckResult>,
    pub issues: Vec<String>,
}

impl DbChecklist {
    pub fn new(table: ClusterTable, author: impl Into<String>, db_name: impl Into<String>) -> Self {
        let summary = ChecklistSummary::compute(&table);
        Self {
            author: author.into(),
            db_name: db_name.into(),
            table,
            summary,
            results: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Record how many sequences the input database holds
    #[must_use]
    pub fn with_input_records(mut self, records: usize) -> Self {
        self.summary.input_records = Some(records);
        self
    }

    /// Run the default checks
    pub fn ticks(&mut self) -> &[CheckResult] {
        self.run_checks(DEFAULT_CHECKS)
    }

    /// Run `checks`, replacing the results of any previous run
    pub fn run_checks(&mut self, checks: &[Check]) -> &[CheckResult] {
        self.results.clear();
        self.issues.clear();

        for check in checks {
            info!("Checking for {}...", check.description);
            let outcome = (check.run)(&self.summary, &self.table);
            match outcome.verdict {
                Verdict::Skipped => debug!(check = check.name, "Skipped: {}", outcome.message),
                Verdict::Pass => info!(check = check.name, "{}", outcome.message),
                Verdict::Warn => warn!(check = check.name, "{}", outcome.message),
            }

            if let Some(issue) = &outcome.issue {
                self.issues.push(issue.clone());
            }
            self.results.push(CheckResult {
                name: check.name,
                verdict: outcome.verdict,
                message: outcome.message,
                issue: outcome.issue,
            });
        }

        &self.results
    }

    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Clusters holding more than one sequence, in file order
    #[must_use]
    pub fn multi_member_clusters(&self) -> Vec<ClusterGroup<'_>> {
        self.table
            .clusters()
            .into_iter()
            .filter(|g| g.size() > 1)
            .collect()
    }

    /// Clusters whose members carry more than one distinct category
    #[must_use]
    pub fn multi_category_clusters(&self) -> Vec<ClusterGroup<'_>> {
        if !self.table.has_categories() {
            return Vec::new();
        }
        self.table
            .clusters()
            .into_iter()
            .filter(|g| g.distinct_categories() > 1)
            .collect()
    }

    /// Sequence ids that occur more than once
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<(&str, Vec<&ClusterMember>)> {
        self.table.duplicate_sequence_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::checks::CheckOutcome;
    use crate::core::types::ClusterId;
    use crate::parsing::category::{extract_categories, CategoryStrategy};
    use crate::parsing::clstr::parse_clustering_text;

    const CLSTR: &str = ">Cluster 0
0\t1269nt, >71|z4,z32... *
1\t1269nt, >72|z4,z32... at +/100.00%
2\t1269nt, >73|z10... at +/100.00%
>Cluster 1
0\t900nt, >80|z10... *
>Cluster 2
0\t850nt, >81|z6... *
";

    fn categorized() -> ClusterTable {
        let mut table = parse_clustering_text(CLSTR).unwrap();
        extract_categories(&mut table, &CategoryStrategy::field("|", 1).unwrap());
        table
    }

    #[test]
    fn test_summary() {
        let table = parse_clustering_text(CLSTR).unwrap();
        let checklist = DbChecklist::new(table, "tester", "toy_db");
        let summary = &checklist.summary;

        assert_eq!(summary.total_entries, 5);
        assert_eq!(summary.total_clusters, 3);
        assert_eq!(summary.n_unique_sequences, 5);
        assert_eq!(summary.cluster_size_distribution.count, 3);
        assert_eq!(summary.cluster_size_distribution.max, Some(3.0));
        assert!(summary.categories.is_none());
        assert!(summary.n_unique_sequences <= summary.total_entries);
        assert!(summary.total_clusters <= summary.total_entries);
    }

    #[test]
    fn test_category_summary() {
        let checklist = DbChecklist::new(categorized(), "tester", "toy_db");
        let categories = checklist.summary.categories.as_ref().unwrap();

        assert_eq!(categories.n_unique_categories, 3);
        assert_eq!(categories.max_categories_per_cluster, 2);
        assert_eq!(categories.categories_by_cluster_distribution.count, 3);
    }

    #[test]
    fn test_ticks_without_categories() {
        let table = parse_clustering_text(CLSTR).unwrap();
        let mut checklist = DbChecklist::new(table, "tester", "toy_db");
        checklist.ticks();

        assert_eq!(
            checklist.issues,
            vec!["Partially and/or completely overlapping sequences.".to_string()]
        );
        let skipped = checklist
            .results
            .iter()
            .filter(|r| r.verdict == Verdict::Skipped)
            .count();
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_ticks_with_categories() {
        let mut checklist = DbChecklist::new(categorized(), "tester", "toy_db").with_input_records(5);
        checklist.ticks();

        assert_eq!(checklist.issues.len(), 2);
        assert!(checklist.issues[1].contains("distinct categories"));

        let multi = checklist.multi_category_clusters();
        assert_eq!(multi.len(), 1);
        assert_eq!(multi[0].id.as_str(), "0");
    }

    #[test]
    fn test_ticks_is_repeatable() {
        let mut checklist = DbChecklist::new(categorized(), "tester", "toy_db");
        checklist.ticks();
        let first = checklist.issues.clone();
        checklist.ticks();
        assert_eq!(checklist.issues, first);
    }

    #[test]
    fn test_check_order_does_not_matter() {
        let mut forward = DbChecklist::new(categorized(), "tester", "toy_db");
        forward.ticks();

        let reversed: Vec<Check> = DEFAULT_CHECKS.iter().rev().copied().collect();
        let mut backward = DbChecklist::new(categorized(), "tester", "toy_db");
        backward.run_checks(&reversed);

        let mut a = forward.issues.clone();
        let mut b = backward.issues.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicate_ids_across_clusters() {
        let table = ClusterTable::new(vec![
            ClusterMember::centroid(ClusterId::new("0"), "dup", 10),
            ClusterMember::centroid(ClusterId::new("1"), "dup", 12),
        ]);
        let mut checklist = DbChecklist::new(table, "tester", "toy_db");
        checklist.ticks();

        assert_eq!(checklist.issues, vec!["More than one sequence with same ID.".to_string()]);
        assert_eq!(checklist.duplicate_ids().len(), 1);
        assert!(checklist.multi_member_clusters().is_empty());
    }

    #[test]
    fn test_custom_check_registration() {
        fn always_warn(_: &ChecklistSummary, table: &ClusterTable) -> CheckOutcome {
            CheckOutcome {
                verdict: Verdict::Warn,
                message: format!("{} records", table.len()),
                issue: Some("custom".to_string()),
            }
        }

        let checks = [Check {
            name: "custom",
            description: "anything",
            run: always_warn,
        }];
        let mut checklist = DbChecklist::new(categorized(), "tester", "toy_db");
        checklist.run_checks(&checks);

        assert_eq!(checklist.issues, vec!["custom".to_string()]);
        assert_eq!(checklist.results[0].message, "5 records");
    }

    #[test]
    fn test_serialized_summary() {
        let checklist = DbChecklist::new(categorized(), "tester", "toy_db");
        let json = serde_json::to_value(&checklist.summary).unwrap();

        assert_eq!(json["total_entries"], 5);
        assert_eq!(json["n_unique_categories"], 3);
        assert!(json.get("input_records").is_none());
    }
}
