//! # db-check
//!
//! Sanity check a FASTA database before release.
//!
//! Curated sequence databases (typing schemes, serotype references, amplicon
//! panels) accumulate problems over time: the same ID used twice, the same
//! sequence deposited under two names, or identical sequences labelled with
//! different categories. `db-check` finds these by clustering the database with
//! CD-HIT and inspecting the clusters.
//!
//! ## Pipeline
//!
//! 1. Validate category options (fails before any other work)
//! 2. Cluster the FASTA with `cd-hit-est` into a temporary directory
//! 3. Parse the `.clstr` report into a [`ClusterTable`]
//! 4. Optionally derive a category per sequence
//! 5. Compute statistics and run the checklist ([`DbChecklist`])
//! 6. Render a Markdown report
//!
//! ## Example
//!
//! ```rust
//! use db_check::parsing::category::{extract_categories, CategoryStrategy};
//! use db_check::parsing::clstr::parse_clustering_text;
//! use db_check::DbChecklist;
//!
//! let clstr = ">Cluster 0\n0\t1269nt, >71|z4,z32... *\n1\t1269nt, >72|z10... at +/100.00%\n";
//! let mut table = parse_clustering_text(clstr).unwrap();
//! extract_categories(&mut table, &CategoryStrategy::field("|", 1).unwrap());
//!
//! let mut checklist = DbChecklist::new(table, "curator", "serotypes");
//! checklist.ticks();
//! assert_eq!(checklist.issues.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Record types and per-cluster grouping
//! - [`parsing`]: Clustering report parser, category extraction, FASTA inspection
//! - [`checklist`]: Statistics and the check registry
//! - [`clustering`]: CD-HIT invocation
//! - [`report`]: Markdown report rendering
//! - [`cli`]: Command-line interface implementation

pub mod checklist;
pub mod cli;
pub mod clustering;
pub mod core;
pub mod parsing;
pub mod report;

// Re-export commonly used types for convenience
pub use crate::checklist::engine::{ChecklistSummary, DbChecklist};
pub use crate::core::member::{ClusterMember, ClusterTable};
pub use crate::core::types::*;
pub use crate::parsing::category::CategoryStrategy;
pub use crate::parsing::clstr::ParseError;
