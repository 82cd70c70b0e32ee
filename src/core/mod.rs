//! Core data types for clustering-based database checks.
//!
//! - [`ClusterMember`]: one sequence occurrence in the clustering output
//! - [`ClusterTable`]: the ordered record collection produced by a parse pass
//! - [`ClusterGroup`]: a borrowed view of the members of one cluster
//! - [`ClusterId`], [`Verdict`]: identifier and check outcome types
//!
//! ## Lifecycle
//!
//! Records are created once per parse and enriched in place by category
//! extraction, which only ever fills the `category` field. The checklist and
//! the report layer read them without modification.

pub mod member;
pub mod types;

pub use member::{ClusterGroup, ClusterMember, ClusterTable, UNPARSED_SIMILARITY};
pub use types::{ClusterId, Verdict};
