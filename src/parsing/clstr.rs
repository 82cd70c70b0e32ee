//! Parser for CD-HIT `.clstr` clustering reports.
//!
//! The report is a sequence of cluster blocks:
//!
//! ```text
//! >Cluster 580
//! 0	1269nt, >71|z4,z32... *
//! 1	1269nt, >72|z4,z32... at +/100.00%
//! ```
//!
//! Marker lines open a cluster; every other line is a member of the most
//! recently opened cluster. Any structural mismatch is fatal, since it means
//! the tool's output format differs from what this parser understands.

use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::member::{ClusterMember, ClusterTable, UNPARSED_SIMILARITY};
use crate::core::types::ClusterId;

/// First character of a line that opens a new cluster
pub const CLUSTER_MARKER: char = '>';

/// Separator between the (possibly truncated) header and the match descriptor
const HEADER_SEPARATOR: &str = "...";

/// Suffix of the length token on member lines
const LENGTH_SUFFIX: &str = "nt,";

/// Percent identity in a match descriptor such as `at +/99.52%`
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,3}(?:\.[0-9]{1,2})?)%").expect("percent pattern is a valid regex")
});

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed clustering output on line {line}: {source} (line: '{text}')")]
    Record {
        line: usize,
        text: String,
        source: RecordError,
    },

    #[error("Cluster {id} on line {line} was already opened earlier in the file")]
    RepeatedCluster { line: usize, id: ClusterId },

    #[error("Invalid input: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),
}

/// Structural problem with a single clustering-output line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("cluster marker has no cluster identifier")]
    MissingClusterId,

    #[error("member line appears before any cluster marker")]
    NoCurrentCluster,

    #[error("expected '<index> <length>nt, ><header>...<match>'")]
    TooFewFields,

    #[error("member index '{0}' is not an integer")]
    InvalidIndex(String),

    #[error("length token '{0}' does not end with '{LENGTH_SUFFIX}'")]
    MissingLengthSuffix(String),

    #[error("length '{0}' is not an integer")]
    InvalidLength(String),

    #[error("no '{HEADER_SEPARATOR}' between header and match descriptor")]
    MissingSeparator,

    #[error("header '{0}' does not start with '>'")]
    MissingHeaderMarker(String),

    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// One classified line of clustering output
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterRecord {
    NewCluster(ClusterId),
    Member(ClusterMember),
}

/// Extract the identifier from a marker line such as `>Cluster 597`.
///
/// # Errors
///
/// Returns `RecordError::MissingClusterId` if the line has no second token.
pub fn parse_cluster_id(line: &str) -> Result<ClusterId, RecordError> {
    line.split_whitespace()
        .nth(1)
        .map(ClusterId::new)
        .ok_or(RecordError::MissingClusterId)
}

/// Parse a member line belonging to `cluster_id`.
///
/// A percentage that cannot be recovered from the match descriptor is not an
/// error: the record gets [`UNPARSED_SIMILARITY`] and a warning is logged.
///
/// # Errors
///
/// Returns a `RecordError` describing the first structural mismatch.
pub fn parse_cluster_member(line: &str, cluster_id: &ClusterId) -> Result<ClusterMember, RecordError> {
    let line = line.trim();

    let (index, rest) = split_token(line).ok_or(RecordError::TooFewFields)?;
    if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
        return Err(RecordError::InvalidIndex(index.to_string()));
    }

    let (length_token, rest) = split_token(rest).ok_or(RecordError::TooFewFields)?;
    let length = length_token
        .strip_suffix(LENGTH_SUFFIX)
        .ok_or_else(|| RecordError::MissingLengthSuffix(length_token.to_string()))?;
    let length: u64 = length
        .parse()
        .map_err(|_| RecordError::InvalidLength(length.to_string()))?;

    let (header, descriptor) = rest
        .rsplit_once(HEADER_SEPARATOR)
        .ok_or(RecordError::MissingSeparator)?;
    let sequence_id = header
        .strip_prefix(CLUSTER_MARKER)
        .ok_or_else(|| RecordError::MissingHeaderMarker(header.to_string()))?;

    let descriptor = descriptor.trim();
    if descriptor.ends_with('*') {
        return Ok(ClusterMember::centroid(cluster_id.clone(), sequence_id, length));
    }

    let similarity = parse_similarity(descriptor).unwrap_or_else(|| {
        warn!(
            cluster = %cluster_id,
            sequence = %sequence_id,
            descriptor = %descriptor,
            "Could not parse percent identity, recording {UNPARSED_SIMILARITY}"
        );
        UNPARSED_SIMILARITY
    });

    Ok(ClusterMember::member(
        cluster_id.clone(),
        sequence_id,
        length,
        similarity,
    ))
}

/// Classify a line as a marker or a member of `current`.
///
/// # Errors
///
/// Returns a `RecordError` for malformed lines, or for member lines when no
/// cluster is open.
pub fn parse_record(line: &str, current: Option<&ClusterId>) -> Result<ClusterRecord, RecordError> {
    if line.starts_with(CLUSTER_MARKER) {
        return parse_cluster_id(line).map(ClusterRecord::NewCluster);
    }
    let cluster_id = current.ok_or(RecordError::NoCurrentCluster)?;
    parse_cluster_member(line, cluster_id).map(ClusterRecord::Member)
}

/// Normalised identity from a descriptor, `None` if absent or above 100%
fn parse_similarity(descriptor: &str) -> Option<f64> {
    let caps = PERCENT_RE.captures(descriptor)?;
    let percent: f64 = caps.get(1)?.as_str().parse().ok()?;
    (percent <= 100.0).then(|| percent / 100.0)
}

/// Split off the first whitespace-delimited token
fn split_token(s: &str) -> Option<(&str, &str)> {
    s.split_once(char::is_whitespace)
        .map(|(token, rest)| (token, rest.trim_start()))
}

/// Line-by-line state machine over a clustering report
#[derive(Debug, Default)]
pub struct ClusteringParser {
    current: Option<ClusterId>,
    opened: HashSet<ClusterId>,
    members: Vec<ClusterMember>,
    line_number: usize,
}

impl ClusteringParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the next line of input as raw bytes, without its `\n`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Record` with `RecordError::InvalidUtf8` if the
    /// line is not UTF-8, otherwise as [`ClusteringParser::push_line`].
    pub fn push_bytes(&mut self, raw: &[u8]) -> Result<(), ParseError> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        match std::str::from_utf8(raw) {
            Ok(line) => self.push_line(line),
            Err(_) => {
                self.line_number += 1;
                Err(ParseError::Record {
                    line: self.line_number,
                    text: String::from_utf8_lossy(raw).trim_end().to_string(),
                    source: RecordError::InvalidUtf8,
                })
            }
        }
    }

    /// Consume the next line of input.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Record` for malformed lines and
    /// `ParseError::RepeatedCluster` if a cluster marker is seen twice.
    pub fn push_line(&mut self, line: &str) -> Result<(), ParseError> {
        self.line_number += 1;

        // Blank lines (e.g. a trailing newline) carry no record
        if line.trim().is_empty() {
            return Ok(());
        }

        let record = parse_record(line, self.current.as_ref()).map_err(|source| {
            ParseError::Record {
                line: self.line_number,
                text: line.trim_end().to_string(),
                source,
            }
        })?;

        match record {
            ClusterRecord::NewCluster(id) => {
                if !self.opened.insert(id.clone()) {
                    return Err(ParseError::RepeatedCluster {
                        line: self.line_number,
                        id,
                    });
                }
                self.current = Some(id);
            }
            ClusterRecord::Member(member) => self.members.push(member),
        }

        Ok(())
    }

    /// Finish parsing and return the collected records
    #[must_use]
    pub fn finish(self) -> ClusterTable {
        debug!(
            clusters = self.opened.len(),
            members = self.members.len(),
            "Parsed clustering output"
        );
        ClusterTable::new(self.members)
    }
}

/// Parse a `.clstr` file produced by CD-HIT
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, a structural
/// `ParseError` for malformed lines, or `ParseError::InvalidFormat` if the
/// file contains no cluster members.
pub fn parse_clustering_file(path: &Path) -> Result<ClusterTable, ParseError> {
    let reader = std::fs::File::open(path).map(BufReader::new)?;
    parse_clustering_reader(reader)
}

/// Parse clustering output from any buffered reader
///
/// # Errors
///
/// See [`parse_clustering_file`].
pub fn parse_clustering_reader<R: BufRead>(reader: R) -> Result<ClusterTable, ParseError> {
    let mut parser = ClusteringParser::new();
    for line in reader.split(b'\n') {
        parser.push_bytes(&line?)?;
    }
    let table = parser.finish();

    if table.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No cluster members found in clustering output".to_string(),
        ));
    }

    Ok(table)
}

/// Parse clustering output held in memory
///
/// # Errors
///
/// See [`parse_clustering_file`].
pub fn parse_clustering_text(text: &str) -> Result<ClusterTable, ParseError> {
    parse_clustering_reader(text.as_bytes())
}
