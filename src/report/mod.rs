//! Report rendering for a completed checklist.
//!
//! The report layer only reads [`DbChecklist`](crate::checklist::DbChecklist)
//! state: statistics, check results, issues and the record table.

pub mod markdown;

pub use markdown::render_report;
