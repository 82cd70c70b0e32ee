//! Markdown report, one section per block separated by blank lines.

use chrono::NaiveDate;

use crate::checklist::distribution::Distribution;
use crate::checklist::engine::DbChecklist;
use crate::core::member::ClusterMember;

const SEP: &str = "---";
const REPO_URL: &str = "https://github.com/andersgs/db-check";

/// Render the full report for a checklist whose checks have run
#[must_use]
pub fn render_report(checklist: &DbChecklist, date: NaiveDate) -> String {
    let mut blocks: Vec<String> = Vec::new();

    preamble(&mut blocks, checklist, date);
    summary(&mut blocks, checklist);
    clusters_summary(&mut blocks, checklist);
    duplicate_report(&mut blocks, checklist);
    category_report(&mut blocks, checklist);
    footer(&mut blocks);

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn preamble(blocks: &mut Vec<String>, checklist: &DbChecklist, date: NaiveDate) {
    blocks.push(format!("# db-check Report {}", checklist.db_name));
    blocks.push(format!(
        "_By {} on {}_",
        checklist.author,
        date.format("%Y-%m-%d")
    ));
    blocks.push(SEP.to_string());
}

fn summary(blocks: &mut Vec<String>, checklist: &DbChecklist) {
    let stats = &checklist.summary;

    blocks.push("## Summary".to_string());
    blocks.push("### Possible issues.".to_string());
    if checklist.issues.is_empty() {
        blocks.push("**Congratulations! No issues were found.**".to_string());
    } else {
        blocks.push(bullet_list(&checklist.issues));
    }

    blocks.push("### Breakdown".to_string());
    let mut breakdown = vec![
        format!("- **Total entries:** {}", stats.total_entries),
        format!("- **Total clusters:** {}", stats.total_clusters),
        format!("- **Unique sequence IDs:** {}", stats.n_unique_sequences),
    ];
    if let Some(records) = stats.input_records {
        breakdown.push(format!("- **Input FASTA records:** {records}"));
    }
    if let Some(categories) = &stats.categories {
        breakdown.push(format!(
            "- **Unique categories:** {}",
            categories.n_unique_categories
        ));
    }
    blocks.push(breakdown.join("\n"));

    if !checklist.results.is_empty() {
        blocks.push("### Checks".to_string());
        let rows: Vec<Vec<String>> = checklist
            .results
            .iter()
            .map(|r| vec![r.name.to_string(), r.verdict.to_string(), r.message.clone()])
            .collect();
        blocks.push(table(&["check", "result", "details"], &rows));
    }

    blocks.push(SEP.to_string());
}

fn clusters_summary(blocks: &mut Vec<String>, checklist: &DbChecklist) {
    blocks.push("## Cluster size distribution".to_string());
    blocks.push("Table: Distribution of cluster sizes (i.e., number of sequences).".to_string());
    blocks.push(distribution_table(&checklist.summary.cluster_size_distribution));
    blocks.push(SEP.to_string());

    let multi = checklist.multi_member_clusters();
    if multi.is_empty() {
        blocks.push(
            "**Congratulations! There were no clusters with more than one sequence.**"
                .to_string(),
        );
        return;
    }

    blocks.push("### Clusters with more than one sequence".to_string());
    let with_category = checklist.table.has_categories();
    for group in multi {
        blocks.push(format!("#### Cluster {}", group.id));
        blocks.push(format!("Table: Sequences in cluster {}", group.id));
        blocks.push(member_table(&group.members, with_category));
    }
    blocks.push(SEP.to_string());
}

fn duplicate_report(blocks: &mut Vec<String>, checklist: &DbChecklist) {
    blocks.push("## Summary of duplicated IDs".to_string());

    let duplicates = checklist.duplicate_ids();
    if duplicates.is_empty() {
        blocks.push("**Congratulations! No duplicated IDs found.**".to_string());
        blocks.push(SEP.to_string());
        return;
    }

    let with_category = checklist.table.has_categories();
    for (id, members) in duplicates {
        blocks.push(format!("### Duplicate ID {}", escape_cell(id)));
        blocks.push(format!("Table: Sequences with ID {}", escape_cell(id)));
        blocks.push(member_table(&members, with_category));
    }
    blocks.push(SEP.to_string());
}

fn category_report(blocks: &mut Vec<String>, checklist: &DbChecklist) {
    let Some(categories) = &checklist.summary.categories else {
        return;
    };

    blocks.push("## Category report".to_string());
    blocks.push("### Distribution of categories by cluster of sequences.".to_string());
    blocks.push("Table: Distribution of categories by cluster of sequences.".to_string());
    blocks.push(distribution_table(
        &categories.categories_by_cluster_distribution,
    ));

    blocks.push("### Clusters with more than one category".to_string());
    let multi = checklist.multi_category_clusters();
    if multi.is_empty() {
        blocks.push(
            "**Congratulations! There were no clusters with more than one category.**"
                .to_string(),
        );
    } else {
        for group in multi {
            blocks.push(format!("#### Cluster {}", group.id));
            blocks.push(format!("Table: Sequences in cluster {}", group.id));
            blocks.push(member_table(&group.members, true));
        }
    }
    blocks.push(SEP.to_string());
}

fn footer(blocks: &mut Vec<String>) {
    blocks.push(format!(
        "_Generated using db-check v{}_",
        env!("CARGO_PKG_VERSION")
    ));
    blocks.push(format!(
        "db-check is on [GitHub]({REPO_URL}). Please submit [issues]({REPO_URL}/issues)"
    ));
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn distribution_table(dist: &Distribution) -> String {
    table(&Distribution::HEADERS, &[dist.row().to_vec()])
}

fn member_table(members: &[&ClusterMember], with_category: bool) -> String {
    let mut headers = vec![
        "cluster_id",
        "sequence_id",
        "length",
        "is_centroid",
        "similarity",
    ];
    if with_category {
        headers.push("category");
    }

    let rows: Vec<Vec<String>> = members
        .iter()
        .map(|m| {
            let mut row = vec![
                m.cluster_id.to_string(),
                m.sequence_id.clone(),
                m.length.to_string(),
                m.is_centroid.to_string(),
                format!("{:.4}", m.similarity),
            ];
            if with_category {
                row.push(m.category.clone().unwrap_or_default());
            }
            row
        })
        .collect();

    table(&headers, &rows)
}

/// Pipe table with escaped cells
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!("| {} |", headers.join(" | ")));
    lines.push(format!(
        "|{}|",
        headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines.join("\n")
}

/// Sequence ids often contain `|`, which would split a table cell
fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}
