//! Command-line interface for db-check.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **check**: Cluster a FASTA database with CD-HIT, run the checklist and print a report
//! - **parse**: Parse an existing CD-HIT `.clstr` file into a record table
//!
//! ## Usage
//!
//! ```text
//! # Check a database, reading categories from the second '|' field of each ID
//! db-check check serotypes.fasta -d '|' -f 1 > report.md
//!
//! # Same, but keep the clustering output for later
//! db-check check serotypes.fasta -d '|' -f 1 --keep-clusters serotypes.clstr
//!
//! # Re-run the checklist on a saved clustering with a regex category
//! db-check check serotypes.fasta --clusters serotypes.clstr -r '\|(.+)$'
//!
//! # Dump the clustering as TSV
//! db-check --format tsv parse serotypes.clstr
//! ```

use clap::{Parser, Subcommand};

use crate::parsing::category::{CategoryError, CategoryStrategy};

pub mod check;
pub mod parse;

#[derive(Parser)]
#[command(name = "db-check")]
#[command(version)]
#[command(about = "Sanity check your FASTA DB before release")]
#[command(
    long_about = "db-check clusters a FASTA database with CD-HIT and looks for problems before release:\n- Sequence IDs used more than once\n- Partially or completely overlapping sequences\n- Overlapping sequences labelled with different categories"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster a FASTA database and report potential issues
    Check(check::CheckArgs),

    /// Parse a CD-HIT .clstr file into a table of records
    Parse(parse::ParseArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown report (check) or readable listing (parse)
    Text,
    Json,
    Tsv,
}

/// Options selecting how categories are read from sequence IDs
#[derive(clap::Args, Debug, Default)]
pub struct CategoryArgs {
    /// When parsing a category from the sequence ID, split on this delimiter
    #[arg(short, long)]
    pub delimiter: Option<String>,

    /// When parsing a category using a delimiter, keep this field (0-based;
    /// -1 for the last element, -2 for second to last, etc.)
    #[arg(short, long, allow_negative_numbers = true)]
    pub field: Option<i64>,

    /// When parsing a category from the sequence ID, keep the single capture
    /// group of this regex
    #[arg(short, long)]
    pub regex: Option<String>,
}

impl CategoryArgs {
    /// Validate the options into at most one strategy
    ///
    /// # Errors
    ///
    /// Returns a `CategoryError` unless the options are empty, a delimiter
    /// with a field, or a regex alone.
    pub fn strategy(&self) -> Result<Option<CategoryStrategy>, CategoryError> {
        CategoryStrategy::from_options(
            self.delimiter.as_deref(),
            self.field,
            self.regex.as_deref(),
        )
    }
}
