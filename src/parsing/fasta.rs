//! FASTA database inspection using noodles.
//!
//! The database is read once before clustering so that an empty or broken
//! file fails fast, and so the number of input records can be compared with
//! what the clustering tool reports back.
//!
//! Supports plain (`.fa`, `.fasta`, `.fna`, `.ffn`) and gzip/bgzip compressed files.

use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::parsing::clstr::ParseError;

/// Record counts for a FASTA database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastaSummary {
    pub records: usize,
    pub total_bases: u64,
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read a FASTA file and count its records.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// a record is malformed, or `ParseError::InvalidFormat` if there are no records.
pub fn summarize_fasta_file(path: &Path) -> Result<FastaSummary, ParseError> {
    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        let mut reader = fasta::io::Reader::new(BufReader::new(MultiGzDecoder::new(file)));
        summarize_fasta_reader(&mut reader)
    } else {
        let mut reader = fasta::io::Reader::new(BufReader::new(file));
        summarize_fasta_reader(&mut reader)
    }
}

fn summarize_fasta_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<FastaSummary, ParseError> {
    let mut summary = FastaSummary {
        records: 0,
        total_bases: 0,
    };

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;
        summary.records += 1;
        summary.total_bases += record.sequence().len() as u64;
    }

    if summary.records == 0 {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_summarize_fasta_file() {
        let fasta_content = b">71|z4,z32 description\nACGTACGT\nACGT\n>72|z4,z32\nGGGG\n";

        let mut temp = NamedTempFile::with_suffix(".fasta").unwrap();
        temp.write_all(fasta_content).unwrap();
        temp.flush().unwrap();

        let summary = summarize_fasta_file(temp.path()).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.total_bases, 16);
    }

    #[test]
    fn test_summarize_gzipped_fasta() {
        let temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        let mut encoder = GzEncoder::new(temp.reopen().unwrap(), Compression::default());
        encoder.write_all(b">a\nACGT\n>b\nAC\n>c\nA\n").unwrap();
        encoder.finish().unwrap();

        let summary = summarize_fasta_file(temp.path()).unwrap();
        assert_eq!(summary.records, 3);
        assert_eq!(summary.total_bases, 7);
    }

    #[test]
    fn test_empty_fasta_is_error() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b"").unwrap();
        temp.flush().unwrap();

        assert!(summarize_fasta_file(temp.path()).is_err());
    }

    #[test]
    fn test_missing_fasta_is_io_error() {
        let result = summarize_fasta_file(Path::new("/nonexistent/db.fasta"));
        assert!(matches!(result, Err(ParseError::Io(_))));
    }
}
