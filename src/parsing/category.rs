//! Category derivation from sequence identifiers.
//!
//! A category is a caller-defined label (serotype, antigen, species...) pulled
//! out of each sequence id. Exactly one strategy is applied per run:
//!
//! | Strategy | Input | Example |
//! |----------|-------|---------|
//! | field    | delimiter + zero-based index (negative counts from the end) | `71\|z4,z32` with `\|`, `1` gives `z4,z32` |
//! | regex    | pattern with exactly one capture group | `^\d+\|(.+)$` |
//! | callback | library use only | any `Fn(&str) -> String` |
//!
//! Records whose category cannot be resolved keep an empty category; the run
//! continues and the count is reported as a warning.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::member::ClusterTable;

/// Category derivation misconfiguration
#[derive(Error, Debug)]
pub enum CategoryError {
    #[error("A delimiter requires a field (--field) to select")]
    MissingField,

    #[error("A field requires a delimiter (--delimiter) to split on")]
    MissingDelimiter,

    #[error("Use either a delimiter and field OR a regex, not both")]
    ConflictingStrategies,

    #[error("Delimiter must not be empty")]
    EmptyDelimiter,

    #[error("Invalid category regex: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("Category regex '{pattern}' must contain exactly one capture group, found {groups}")]
    CaptureGroups { pattern: String, groups: usize },
}

/// How to derive a category from a sequence id
#[derive(Clone)]
pub enum CategoryStrategy {
    /// Split on `delimiter` and keep the field at `index`
    Field { delimiter: String, index: i64 },

    /// Keep the single capture group of the pattern
    Regex(Regex),

    /// Injected mapping, not reachable from the command line
    Callback(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl fmt::Debug for CategoryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { delimiter, index } => f
                .debug_struct("Field")
                .field("delimiter", delimiter)
                .field("index", index)
                .finish(),
            Self::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            Self::Callback(_) => f.write_str("Callback"),
        }
    }
}

impl fmt::Display for CategoryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { delimiter, index } => {
                write!(f, "field {index} after splitting on '{delimiter}'")
            }
            Self::Regex(re) => write!(f, "regex '{}'", re.as_str()),
            Self::Callback(_) => write!(f, "custom callback"),
        }
    }
}

impl CategoryStrategy {
    /// Build a field strategy.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyDelimiter` for an empty delimiter.
    pub fn field(delimiter: impl Into<String>, index: i64) -> Result<Self, CategoryError> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(CategoryError::EmptyDelimiter);
        }
        Ok(Self::Field { delimiter, index })
    }

    /// Build a regex strategy.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::InvalidRegex` if the pattern does not compile, or
    /// `CategoryError::CaptureGroups` unless it has exactly one capture group.
    pub fn regex(pattern: &str) -> Result<Self, CategoryError> {
        let re = Regex::new(pattern)?;
        // captures_len counts the implicit whole-match group
        let groups = re.captures_len() - 1;
        if groups != 1 {
            return Err(CategoryError::CaptureGroups {
                pattern: pattern.to_string(),
                groups,
            });
        }
        Ok(Self::Regex(re))
    }

    pub fn callback(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(f))
    }

    /// Validate command-line style options into at most one strategy.
    ///
    /// Valid combinations are: nothing, delimiter with field, or regex alone.
    ///
    /// # Errors
    ///
    /// Returns a `CategoryError` for any other combination, or if the chosen
    /// strategy itself is invalid.
    pub fn from_options(
        delimiter: Option<&str>,
        field: Option<i64>,
        regex: Option<&str>,
    ) -> Result<Option<Self>, CategoryError> {
        match (delimiter, field, regex) {
            (None, None, None) => Ok(None),
            (Some(delimiter), Some(index), None) => Self::field(delimiter, index).map(Some),
            (None, None, Some(pattern)) => Self::regex(pattern).map(Some),
            (_, _, Some(_)) => Err(CategoryError::ConflictingStrategies),
            (Some(_), None, None) => Err(CategoryError::MissingField),
            (None, Some(_), None) => Err(CategoryError::MissingDelimiter),
        }
    }

    /// Derive the category for one sequence id, `None` if unresolvable
    #[must_use]
    pub fn resolve(&self, sequence_id: &str) -> Option<String> {
        match self {
            Self::Field { delimiter, index } => {
                let fields: Vec<&str> = sequence_id.split(delimiter.as_str()).collect();
                let position = if *index < 0 {
                    let back = usize::try_from(index.unsigned_abs()).ok()?;
                    fields.len().checked_sub(back)?
                } else {
                    usize::try_from(*index).ok()?
                };
                fields.get(position).map(|s| (*s).to_string())
            }
            Self::Regex(re) => re
                .captures(sequence_id)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
            Self::Callback(f) => Some(f(sequence_id)),
        }
    }
}

/// Counts from one extraction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractionSummary {
    pub resolved: usize,
    pub unresolved: usize,
}

/// Populate the category of every record in `table`.
///
/// Existing categories are overwritten, so repeated runs with the same
/// strategy give the same result. Only the `category` field is touched.
pub fn extract_categories(table: &mut ClusterTable, strategy: &CategoryStrategy) -> ExtractionSummary {
    let mut summary = ExtractionSummary::default();

    for member in &mut table.members {
        member.category = strategy.resolve(&member.sequence_id);
        if member.category.is_some() {
            summary.resolved += 1;
        } else {
            summary.unresolved += 1;
            debug!(sequence = %member.sequence_id, "No category for sequence");
        }
    }
    table.mark_categorized();

    if summary.unresolved > 0 {
        warn!(
            unresolved = summary.unresolved,
            strategy = %strategy,
            "Could not derive a category for some sequences, leaving them empty"
        );
    }

    summary
}
