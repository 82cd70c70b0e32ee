use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{CategoryArgs, OutputFormat};
use crate::core::member::{ClusterMember, ClusterTable};
use crate::parsing::category::extract_categories;
use crate::parsing::clstr::parse_clustering_file;

#[derive(Args)]
pub struct ParseArgs {
    /// CD-HIT cluster report (.clstr)
    #[arg(required = true)]
    pub clusters: PathBuf,

    #[command(flatten)]
    pub category: CategoryArgs,
}

/// Execute parse subcommand
///
/// # Errors
///
/// Returns an error for invalid category options or malformed clustering output.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ParseArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let strategy = args
        .category
        .strategy()
        .context("Delimiter and field must be specified OR regex OR neither")?;

    let mut table = parse_clustering_file(&args.clusters)
        .with_context(|| format!("Failed to parse clustering output {}", args.clusters.display()))?;

    if let Some(strategy) = &strategy {
        extract_categories(&mut table, strategy);
    }

    if verbose {
        eprintln!(
            "Parsed {} records in {} clusters",
            table.len(),
            table.clusters().len()
        );
    }

    match format {
        OutputFormat::Text => print_text_records(&table),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table.members)?),
        OutputFormat::Tsv => print_tsv_records(&table),
    }

    Ok(())
}

fn print_text_records(table: &ClusterTable) {
    for group in table.clusters() {
        println!("Cluster {} ({} sequences)", group.id, group.size());
        for member in &group.members {
            println!("  {}", text_line(member));
        }
    }
}

fn text_line(member: &ClusterMember) -> String {
    let marker = if member.is_centroid { '*' } else { ' ' };
    let similarity = if member.has_similarity() {
        format!("{:.2}%", member.similarity * 100.0)
    } else {
        "?".to_string()
    };
    match &member.category {
        Some(category) => format!(
            "{marker} {}\t{}nt\t{similarity}\t[{category}]",
            member.sequence_id, member.length
        ),
        None => format!(
            "{marker} {}\t{}nt\t{similarity}",
            member.sequence_id, member.length
        ),
    }
}

fn print_tsv_records(table: &ClusterTable) {
    let with_category = table.has_categories();
    if with_category {
        println!("cluster_id\tsequence_id\tlength\tis_centroid\tsimilarity\tcategory");
    } else {
        println!("cluster_id\tsequence_id\tlength\tis_centroid\tsimilarity");
    }
    for m in &table.members {
        let row = format!(
            "{}\t{}\t{}\t{}\t{:.4}",
            m.cluster_id, m.sequence_id, m.length, m.is_centroid, m.similarity
        );
        if with_category {
            println!("{row}\t{}", m.category.as_deref().unwrap_or_default());
        } else {
            println!("{row}");
        }
    }
}
