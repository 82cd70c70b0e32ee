use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::checklist::engine::DbChecklist;
use crate::cli::{CategoryArgs, OutputFormat};
use crate::clustering::cdhit::{CdHit, DEFAULT_THREADS};
use crate::core::member::ClusterTable;
use crate::parsing::category::extract_categories;
use crate::parsing::clstr::parse_clustering_file;
use crate::parsing::fasta::summarize_fasta_file;
use crate::report::render_report;

/// Prefix for the files CD-HIT writes into its temporary directory
const CLUSTER_PREFIX: &str = "cdhit";

#[derive(Args)]
pub struct CheckArgs {
    /// FASTA database to check (plain, gzip or bgzip compressed)
    #[arg(required = true)]
    pub fasta: PathBuf,

    #[command(flatten)]
    pub category: CategoryArgs,

    /// Who is running the check (default: $USER)
    #[arg(short, long)]
    pub author: Option<String>,

    /// Name of the database (default: FASTA file name without extension)
    #[arg(short = 'n', long)]
    pub db_name: Option<String>,

    /// Threads for CD-HIT (0 uses all cores)
    #[arg(short, long, default_value_t = DEFAULT_THREADS)]
    pub threads: u32,

    /// Sequence identity threshold for clustering
    #[arg(short = 'c', long, default_value = "1.0", value_parser = parse_identity)]
    pub identity: f64,

    /// Keep a copy of the CD-HIT .clstr output at this path
    #[arg(long)]
    pub keep_clusters: Option<PathBuf>,

    /// Use an existing CD-HIT .clstr file instead of running CD-HIT
    #[arg(long, conflicts_with = "keep_clusters")]
    pub clusters: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// cd-hit-est accepts identities between 0.8 and 1.0, given to two decimals
fn parse_identity(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if s.trim().split_once('.').is_some_and(|(_, decimals)| decimals.len() > 2) {
        return Err(format!("identity must have at most two decimals, got {s}"));
    }
    if (0.8..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("identity must be between 0.8 and 1.0, got {value}"))
    }
}

/// Execute check subcommand
///
/// # Errors
///
/// Returns an error for invalid category options (before any other work), an
/// unreadable FASTA, a missing or failing CD-HIT, or malformed clustering output.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CheckArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let strategy = args
        .category
        .strategy()
        .context("Delimiter and field must be specified OR regex OR neither")?;

    let db_name = args
        .db_name
        .clone()
        .unwrap_or_else(|| default_db_name(&args.fasta));
    let author = args.author.clone().unwrap_or_else(default_author);

    // A missing CD-HIT is a configuration error, reported before the FASTA is read
    let cdhit = match &args.clusters {
        Some(_) => None,
        None => {
            let cdhit = CdHit::from_env()
                .with_threads(args.threads)
                .with_identity(args.identity);
            cdhit.detect_version()?;
            Some(cdhit)
        }
    };

    let fasta = summarize_fasta_file(&args.fasta)
        .with_context(|| format!("Failed to read FASTA database {}", args.fasta.display()))?;
    info!(
        "Read {} sequences ({} bases) from {}",
        fasta.records,
        fasta.total_bases,
        args.fasta.display()
    );

    let mut table = load_clusters(&args, cdhit.as_ref())?;

    if let Some(strategy) = &strategy {
        let extracted = extract_categories(&mut table, strategy);
        if verbose {
            eprintln!(
                "Derived categories for {} of {} sequences using {strategy}",
                extracted.resolved,
                table.len()
            );
        }
    }

    let mut checklist = DbChecklist::new(table, author, db_name).with_input_records(fasta.records);
    checklist.ticks();

    let rendered = match format {
        OutputFormat::Text => render_report(&checklist, chrono::Local::now().date_naive()),
        OutputFormat::Json => json_report(&checklist)?,
        OutputFormat::Tsv => tsv_report(&checklist),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

/// Parse saved clustering output, or run the already detected CD-HIT and parse
/// its output.
///
/// The temporary CD-HIT directory is removed when this returns, whether or not
/// parsing succeeded; `--keep-clusters` copies the report out first.
fn load_clusters(args: &CheckArgs, cdhit: Option<&CdHit>) -> anyhow::Result<ClusterTable> {
    let Some(cdhit) = cdhit else {
        let path = args
            .clusters
            .as_ref()
            .context("Either CD-HIT or an existing clustering output is required")?;
        info!("Using existing clustering output {}", path.display());
        return parse_clustering_file(path)
            .with_context(|| format!("Failed to parse clustering output {}", path.display()));
    };

    let run = cdhit.cluster(&args.fasta, CLUSTER_PREFIX)?;
    if let Some(keep) = &args.keep_clusters {
        run.persist_to(keep)?;
    }

    parse_clustering_file(run.clusters_path()).with_context(|| {
        format!(
            "Failed to parse CD-HIT output; the installed {} may write a format this version does not understand",
            cdhit.executable()
        )
    })
}

/// File name without directories, compression suffix or FASTA extension
fn default_db_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = name
        .strip_suffix(".gz")
        .or_else(|| name.strip_suffix(".bgz"))
        .unwrap_or(name.as_str());
    Path::new(name)
        .file_stem()
        .map_or_else(|| name.to_string(), |s| s.to_string_lossy().to_string())
}

fn default_author() -> String {
    ["USER", "USERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn json_report(checklist: &DbChecklist) -> anyhow::Result<String> {
    let output = serde_json::json!({
        "db_name": checklist.db_name,
        "author": checklist.author,
        "summary": checklist.summary,
        "checks": checklist.results,
        "issues": checklist.issues,
    });
    Ok(format!("{}\n", serde_json::to_string_pretty(&output)?))
}

fn tsv_report(checklist: &DbChecklist) -> String {
    let stats = &checklist.summary;
    let mut lines = vec![
        "key\tvalue".to_string(),
        format!("db_name\t{}", checklist.db_name),
        format!("author\t{}", checklist.author),
        format!("total_entries\t{}", stats.total_entries),
        format!("total_clusters\t{}", stats.total_clusters),
        format!("n_unique_sequences\t{}", stats.n_unique_sequences),
    ];
    if let Some(records) = stats.input_records {
        lines.push(format!("input_records\t{records}"));
    }
    if let Some(categories) = &stats.categories {
        lines.push(format!(
            "n_unique_categories\t{}",
            categories.n_unique_categories
        ));
    }
    for result in &checklist.results {
        lines.push(format!("check:{}\t{}", result.name, result.verdict));
    }
    for issue in &checklist.issues {
        lines.push(format!("issue\t{issue}"));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_name() {
        assert_eq!(default_db_name(Path::new("/data/serotypes.fasta")), "serotypes");
        assert_eq!(default_db_name(Path::new("db.fa.gz")), "db");
        assert_eq!(default_db_name(Path::new("plain")), "plain");
    }

    #[test]
    fn test_parse_identity() {
        assert_eq!(parse_identity("1.0"), Ok(1.0));
        assert_eq!(parse_identity("0.95"), Ok(0.95));
        assert!(parse_identity("0.5").is_err());
        assert!(parse_identity("abc").is_err());
        assert!(parse_identity("0.955").is_err());
        assert_eq!(parse_identity("0.8"), Ok(0.8));
    }

    #[test]
    fn test_tsv_report() {
        let table = crate::parsing::clstr::parse_clustering_text(
            ">Cluster 0\n0\t10nt, >a... *\n1\t10nt, >b... at +/100.00%\n",
        )
        .unwrap();
        let mut checklist = DbChecklist::new(table, "alice", "db").with_input_records(2);
        checklist.ticks();

        let tsv = tsv_report(&checklist);
        assert!(tsv.contains("total_clusters\t1\n"));
        assert!(tsv.contains("check:overlapping_sequences\tWARN\n"));
        assert!(tsv.contains("issue\tPartially and/or completely overlapping sequences.\n"));
    }
}
