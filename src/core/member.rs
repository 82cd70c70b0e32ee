use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::types::ClusterId;

/// Similarity recorded for member rows whose percentage could not be parsed
pub const UNPARSED_SIMILARITY: f64 = -1.0;

/// A single sequence occurrence in the clustering output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    /// Owning cluster
    pub cluster_id: ClusterId,

    /// Sequence identifier from the FASTA header, verbatim
    pub sequence_id: String,

    /// Number of bases
    pub length: u64,

    /// True for the cluster's representative sequence
    pub is_centroid: bool,

    /// Identity versus the centroid in [0, 1], or [`UNPARSED_SIMILARITY`]
    pub similarity: f64,

    /// Caller-defined label, only set after category extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ClusterMember {
    pub fn centroid(cluster_id: ClusterId, sequence_id: impl Into<String>, length: u64) -> Self {
        Self {
            cluster_id,
            sequence_id: sequence_id.into(),
            length,
            is_centroid: true,
            similarity: 1.0,
            category: None,
        }
    }

    pub fn member(
        cluster_id: ClusterId,
        sequence_id: impl Into<String>,
        length: u64,
        similarity: f64,
    ) -> Self {
        Self {
            cluster_id,
            sequence_id: sequence_id.into(),
            length,
            is_centroid: false,
            similarity,
            category: None,
        }
    }

    #[cfg(test)]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Whether the similarity score was recovered from the clustering output
    #[must_use]
    pub fn has_similarity(&self) -> bool {
        self.similarity >= 0.0
    }
}

/// Borrowed view of all members sharing one cluster id, in input order
#[derive(Debug, Clone)]
pub struct ClusterGroup<'a> {
    pub id: &'a ClusterId,
    pub members: Vec<&'a ClusterMember>,
}

impl ClusterGroup<'_> {
    #[must_use]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Number of distinct non-empty categories among the members
    #[must_use]
    pub fn distinct_categories(&self) -> usize {
        let mut seen: Vec<&str> = self
            .members
            .iter()
            .filter_map(|m| m.category.as_deref())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

/// Ordered collection of parsed cluster members
///
/// Records keep input line order; nothing is ever removed or deduplicated.
#[derive(Debug, Clone, Default)]
pub struct ClusterTable {
    pub members: Vec<ClusterMember>,

    /// Set once a category strategy has been applied
    categorized: bool,
}

impl ClusterTable {
    #[must_use]
    pub fn new(members: Vec<ClusterMember>) -> Self {
        Self {
            members,
            categorized: false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether category extraction has run over this table
    #[must_use]
    pub fn has_categories(&self) -> bool {
        self.categorized
    }

    pub(crate) fn mark_categorized(&mut self) {
        self.categorized = true;
    }

    /// Group members by cluster, ordered by first occurrence of each cluster
    #[must_use]
    pub fn clusters(&self) -> Vec<ClusterGroup<'_>> {
        let mut index: HashMap<&ClusterId, usize> = HashMap::new();
        let mut groups: Vec<ClusterGroup<'_>> = Vec::new();

        for member in &self.members {
            let slot = *index.entry(&member.cluster_id).or_insert_with(|| {
                groups.push(ClusterGroup {
                    id: &member.cluster_id,
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].members.push(member);
        }

        groups
    }

    /// Sequence ids occurring more than once, with every occurrence
    #[must_use]
    pub fn duplicate_sequence_ids(&self) -> Vec<(&str, Vec<&ClusterMember>)> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<&ClusterMember>)> = Vec::new();

        for member in &self.members {
            let id = member.sequence_id.as_str();
            let slot = *index.entry(id).or_insert_with(|| {
                groups.push((id, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(member);
        }

        groups.retain(|(_, members)| members.len() > 1);
        groups
    }
}
