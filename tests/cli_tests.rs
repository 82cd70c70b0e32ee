//! End-to-end tests of the db-check binary.
//!
//! These use saved clustering output (`--clusters`) or the `parse` subcommand,
//! so CD-HIT does not need to be installed.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FASTA: &str = ">71|z4,z32
ACGTACGTACGT
>72|z4,z32
ACGTACGTACGT
>73|z10
ACGTACGTACGT
>80|z6
GGGGCCCCAAAA
";

const CLSTR: &str = ">Cluster 0
0\t12nt, >71|z4,z32... *
1\t12nt, >72|z4,z32... at +/100.00%
2\t12nt, >73|z10... at +/100.00%
>Cluster 1
0\t12nt, >80|z6... *
";

fn write_inputs(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let fasta = dir.path().join("serotypes.fasta");
    let clstr = dir.path().join("serotypes.clstr");
    std::fs::write(&fasta, FASTA).unwrap();
    std::fs::write(&clstr, CLSTR).unwrap();
    (fasta, clstr)
}

fn db_check() -> Command {
    Command::cargo_bin("db-check").unwrap()
}

#[test]
fn test_delimiter_without_field_fails_before_reading_input() {
    // The FASTA does not exist: the option error must win
    db_check()
        .args(["check", "/nonexistent/db.fasta", "-d", "|"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Delimiter and field must be specified OR regex OR neither",
        ))
        .stderr(predicate::str::contains("Failed to read FASTA").not());
}

#[test]
fn test_regex_with_field_is_rejected() {
    db_check()
        .args(["check", "/nonexistent/db.fasta", "-f", "1", "-r", "(.+)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not both"));
}

#[test]
fn test_regex_without_group_is_rejected() {
    db_check()
        .args(["parse", "/nonexistent/db.clstr", "-r", "z[0-9]+"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly one capture group"));
}

#[test]
fn test_check_with_saved_clusters() {
    let dir = TempDir::new().unwrap();
    let (fasta, clstr) = write_inputs(&dir);

    db_check()
        .arg("check")
        .arg(&fasta)
        .arg("--clusters")
        .arg(&clstr)
        .args(["-d", "|", "-f", "-1", "-a", "curator"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# db-check Report serotypes"))
        .stdout(predicate::str::contains("_By curator on "))
        .stdout(predicate::str::contains(
            "- Partially and/or completely overlapping sequences.",
        ))
        .stdout(predicate::str::contains(
            "- Partially and/or completely overlapping sequences with distinct categories.",
        ))
        .stdout(predicate::str::contains("**Congratulations! No duplicated IDs found.**"))
        .stdout(predicate::str::contains("- **Input FASTA records:** 4"))
        .stderr(predicate::str::contains("Checking for duplicated sequence IDs"));
}

#[test]
fn test_check_json_output_to_file() {
    let dir = TempDir::new().unwrap();
    let (fasta, clstr) = write_inputs(&dir);
    let report = dir.path().join("out").join("report.json");
    std::fs::create_dir_all(report.parent().unwrap()).unwrap();

    db_check()
        .args(["--format", "json", "check"])
        .arg(&fasta)
        .arg("--clusters")
        .arg(&clstr)
        .args(["-n", "my_db", "-r", r"\|(.+)$", "-o"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["db_name"], "my_db");
    assert_eq!(json["summary"]["total_entries"], 4);
    assert_eq!(json["summary"]["total_clusters"], 2);
    assert_eq!(json["summary"]["n_unique_categories"], 3);
    assert_eq!(json["summary"]["cluster_size_distribution"]["max"], 3.0);
    assert_eq!(json["issues"].as_array().unwrap().len(), 2);
}

#[test]
fn test_check_reports_missing_records() {
    let dir = TempDir::new().unwrap();
    let (fasta, _) = write_inputs(&dir);
    let partial = dir.path().join("partial.clstr");
    std::fs::write(&partial, ">Cluster 0\n0\t12nt, >71|z4,z32... *\n").unwrap();

    db_check()
        .args(["--format", "tsv", "check"])
        .arg(&fasta)
        .arg("--clusters")
        .arg(&partial)
        .assert()
        .success()
        .stdout(predicate::str::contains("check:clustered_all_records\tWARN"))
        .stdout(predicate::str::contains(
            "issue\tClustering reported 1 sequences but the database has 4.",
        ));
}

#[test]
fn test_malformed_clusters_fail() {
    let dir = TempDir::new().unwrap();
    let (fasta, _) = write_inputs(&dir);
    let broken = dir.path().join("broken.clstr");
    std::fs::write(&broken, ">Cluster 0\n0\t12aa, >71... *\n").unwrap();

    db_check()
        .arg("check")
        .arg(&fasta)
        .arg("--clusters")
        .arg(&broken)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed clustering output on line 2"));
}

#[test]
fn test_parse_tsv() {
    let dir = TempDir::new().unwrap();
    let (_, clstr) = write_inputs(&dir);

    db_check()
        .args(["parse", "--format", "tsv"])
        .arg(&clstr)
        .args(["-d", "|", "-f", "1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "cluster_id\tsequence_id\tlength\tis_centroid\tsimilarity\tcategory\n",
        ))
        .stdout(predicate::str::contains("0\t72|z4,z32\t12\tfalse\t1.0000\tz4,z32\n"))
        .stdout(predicate::str::contains("1\t80|z6\t12\ttrue\t1.0000\tz6\n"));
}

#[test]
fn test_parse_json() {
    let dir = TempDir::new().unwrap();
    let (_, clstr) = write_inputs(&dir);

    let output = db_check()
        .args(["--format", "json", "parse"])
        .arg(&clstr)
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["cluster_id"], "0");
    assert_eq!(records[0]["sequence_id"], "71|z4,z32");
    assert_eq!(records[0]["is_centroid"], true);
    assert!(records[0].get("category").is_none());
}

#[test]
fn test_missing_cdhit_is_reported() {
    let dir = TempDir::new().unwrap();
    let (fasta, _) = write_inputs(&dir);

    db_check()
        .env("DB_CHECK_CDHIT_BIN", "db-check-no-such-cd-hit-binary")
        .arg("check")
        .arg(&fasta)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not find CD-HIT executable"));
}

#[test]
fn test_missing_cdhit_reported_before_reading_fasta() {
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty.fasta");
    std::fs::write(&empty, "").unwrap();

    db_check()
        .env("DB_CHECK_CDHIT_BIN", "db-check-no-such-cd-hit-binary")
        .arg("check")
        .arg(&empty)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not find CD-HIT executable"))
        .stderr(predicate::str::contains("No sequences found").not());
}

#[test]
fn test_identity_with_three_decimals_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (fasta, _) = write_inputs(&dir);

    db_check()
        .args(["check", "-c", "0.955"])
        .arg(&fasta)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most two decimals"));
}

#[test]
fn test_parse_missing_file() {
    db_check()
        .args(["parse"])
        .arg(Path::new("/nonexistent/none.clstr"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse clustering output"));
}
