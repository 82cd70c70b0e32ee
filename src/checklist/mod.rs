//! Checklist evaluation over a parsed clustering.
//!
//! [`DbChecklist`] computes aggregate statistics once, then runs each check in
//! the registry ([`DEFAULT_CHECKS`]). Checks only read those statistics and
//! the record table, so they are independent of each other.
//!
//! ## Default checks
//!
//! | Check | Warns when |
//! |-------|------------|
//! | `duplicate_ids` | distinct sequence ids < total entries |
//! | `overlapping_sequences` | total clusters < total entries |
//! | `overlapping_distinct_categories` | any cluster has more than one category (needs categories) |
//! | `clustered_all_records` | clustered entries differ from input FASTA records (needs FASTA count) |

pub mod checks;
pub mod distribution;
pub mod engine;

pub use checks::{Check, CheckOutcome, CheckResult, DEFAULT_CHECKS};
pub use distribution::Distribution;
pub use engine::{CategoryStats, ChecklistSummary, DbChecklist};
