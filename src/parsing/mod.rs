//! Parsers for the inputs and outputs of a database check.
//!
//! - **Clustering reports** ([`clstr`]): CD-HIT `.clstr` files into [`ClusterTable`]s
//! - **Categories** ([`category`]): derive a category per record from its sequence id
//! - **FASTA databases** ([`fasta`]): count input records before clustering
//!
//! ## Example
//!
//! ```rust
//! use db_check::parsing::category::{extract_categories, CategoryStrategy};
//! use db_check::parsing::clstr::parse_clustering_text;
//!
//! let text = ">Cluster 580\n0\t1269nt, >71|z4,z32... *\n1\t1269nt, >72|z4,z32... at +/100.00%\n";
//! let mut table = parse_clustering_text(text).unwrap();
//!
//! let strategy = CategoryStrategy::field("|", 1).unwrap();
//! extract_categories(&mut table, &strategy);
//! assert_eq!(table.members[1].category.as_deref(), Some("z4,z32"));
//! ```
//!
//! [`ClusterTable`]: crate::core::member::ClusterTable

pub mod category;
pub mod clstr;
pub mod fasta;
