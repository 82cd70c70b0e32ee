//! Invocation of the external clustering tool.
//!
//! Only CD-HIT (`cd-hit-est`) is supported. The call is blocking; the core
//! waits for the tool and treats its output as immutable afterwards.

pub mod cdhit;

pub use cdhit::{CdHit, ClusteringError, ClusteringRun};
