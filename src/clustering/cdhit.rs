//! Clustering of a FASTA database with `cd-hit-est`.
//!
//! The tool writes its representative sequences to `<prefix>` and the cluster
//! report to `<prefix>.clstr`. Both live in a temporary directory owned by the
//! returned [`ClusteringRun`], which removes it when dropped.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::LazyLock;

use regex::Regex;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_CDHIT_BIN: &str = "cd-hit-est";
pub const CDHIT_ENV_BIN: &str = "DB_CHECK_CDHIT_BIN";

/// Default identity threshold: only identical (sub)sequences cluster together
pub const DEFAULT_IDENTITY: f64 = 1.0;
pub const DEFAULT_THREADS: u32 = 4;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]\.[0-9]{1,2})").expect("version pattern is a valid regex"));

#[derive(Error, Debug)]
pub enum ClusteringError {
    #[error(
        "Could not find CD-HIT executable '{executable}'. Add it to your PATH or install it \
         (e.g. `brew install cd-hit` or `conda install -c bioconda cd-hit`), or set {CDHIT_ENV_BIN}"
    )]
    ToolNotFound { executable: String },

    #[error(
        "CD-HIT command failed: {executable} {args} (status={status:?}, stderr='{stderr}'). \
         Check that the input is a nucleotide FASTA file, or rerun the command above by hand \
         to see the full output"
    )]
    ToolFailed {
        executable: String,
        args: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("CD-HIT reported success but did not produce '{}'", .path.display())]
    MissingOutput { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings for a `cd-hit-est` invocation
#[derive(Debug, Clone)]
pub struct CdHit {
    executable: String,
    threads: u32,
    identity: f64,
}

impl Default for CdHit {
    fn default() -> Self {
        Self {
            executable: DEFAULT_CDHIT_BIN.to_string(),
            threads: DEFAULT_THREADS,
            identity: DEFAULT_IDENTITY,
        }
    }
}

impl CdHit {
    /// Use the executable named by `DB_CHECK_CDHIT_BIN`, falling back to `cd-hit-est`
    #[must_use]
    pub fn from_env() -> Self {
        let executable = std::env::var(CDHIT_ENV_BIN)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CDHIT_BIN.to_string());
        Self {
            executable,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Worker threads for the tool (`0` lets it use every core)
    #[must_use]
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    #[must_use]
    pub fn with_identity(mut self, identity: f64) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Arguments for clustering `input` into `output_prefix`
    #[must_use]
    pub fn args(&self, input: &Path, output_prefix: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output_prefix.display().to_string(),
            "-c".to_string(),
            format!("{:.2}", self.identity),
            "-g".to_string(),
            "1".to_string(),
            "-T".to_string(),
            self.threads.to_string(),
            "-d".to_string(),
            "0".to_string(),
        ]
    }

    fn run(&self, args: &[String]) -> Result<Output, ClusteringError> {
        debug!(executable = %self.executable, args = %args.join(" "), "Running CD-HIT");
        Command::new(&self.executable)
            .args(args)
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    ClusteringError::ToolNotFound {
                        executable: self.executable.clone(),
                    }
                } else {
                    ClusteringError::Io(e)
                }
            })
    }

    /// Check that the executable is available and report its version.
    ///
    /// `cd-hit-est -h` exits with status 1 after printing its usage, so both 0
    /// and 1 are accepted.
    ///
    /// # Errors
    ///
    /// Returns `ClusteringError::ToolNotFound` if the executable cannot be
    /// started, or `ClusteringError::ToolFailed` for any other exit status.
    pub fn detect_version(&self) -> Result<Option<String>, ClusteringError> {
        info!("Checking if CD-HIT is present in the PATH...");
        let args = vec!["-h".to_string()];
        let output = self.run(&args)?;

        if !matches!(output.status.code(), Some(0 | 1)) {
            return Err(self.failure(&args, &output));
        }

        let text = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let version = VERSION_RE
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        match &version {
            Some(v) => info!("Found CD-HIT version {v}"),
            None => info!("Found CD-HIT at '{}' (version unknown)", self.executable),
        }
        Ok(version)
    }

    /// Cluster `fasta` into a fresh temporary directory.
    ///
    /// Blocks until the tool exits.
    ///
    /// # Errors
    ///
    /// Returns `ClusteringError::ToolNotFound` if the executable cannot be
    /// started, `ClusteringError::ToolFailed` on a non-zero exit, or
    /// `ClusteringError::MissingOutput` if no `.clstr` file was written.
    pub fn cluster(&self, fasta: &Path, prefix: &str) -> Result<ClusteringRun, ClusteringError> {
        let workdir = tempfile::Builder::new().prefix("db-check-").tempdir()?;
        let output_prefix = workdir.path().join(prefix);
        let args = self.args(fasta, &output_prefix);

        info!(
            threads = self.threads,
            identity = self.identity,
            "Clustering {} with {}...",
            fasta.display(),
            self.executable
        );
        let output = self.run(&args)?;
        if !output.status.success() {
            return Err(self.failure(&args, &output));
        }

        let clusters = clstr_path(&output_prefix);
        if !clusters.exists() {
            return Err(ClusteringError::MissingOutput { path: clusters });
        }

        Ok(ClusteringRun { workdir, clusters })
    }

    fn failure(&self, args: &[String], output: &Output) -> ClusteringError {
        ClusteringError::ToolFailed {
            executable: self.executable.clone(),
            args: args.join(" "),
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Path of the cluster report CD-HIT writes for `output_prefix`
fn clstr_path(output_prefix: &Path) -> PathBuf {
    let mut name = output_prefix.as_os_str().to_os_string();
    name.push(".clstr");
    PathBuf::from(name)
}

/// Artifacts of one clustering run, removed on drop
#[derive(Debug)]
pub struct ClusteringRun {
    workdir: TempDir,
    clusters: PathBuf,
}

impl ClusteringRun {
    /// The `.clstr` report
    #[must_use]
    pub fn clusters_path(&self) -> &Path {
        &self.clusters
    }

    #[must_use]
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Copy the `.clstr` report to `destination` so it outlives this run.
    ///
    /// # Errors
    ///
    /// Returns `ClusteringError::Io` if the copy fails.
    pub fn persist_to(&self, destination: &Path) -> Result<(), ClusteringError> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::copy(&self.clusters, destination)?;
        info!("Saved clustering output to {}", destination.display());
        Ok(())
    }
}
