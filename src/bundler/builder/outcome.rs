//! Build results.

use std::path::PathBuf;

/// A pipeline step, recorded in the order it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Staged,
    DepsInstalled,
    DepsSkipped,
    Cleaned,
    CleanSkipped,
    Bootstrapped,
    BootstrapSkipped,
    Assembled,
    LauncherWritten,
    LauncherSkipped,
    Done,
}

/// Everything a successful build produced.
#[derive(Debug, Clone)]
pub struct BundledArtifact {
    /// The `.pyz` archive.
    pub path: PathBuf,

    /// Launcher script, if one was requested and written.
    pub launcher: Option<PathBuf>,

    /// Archive size in bytes.
    pub size: u64,

    /// Hex SHA-256 of the archive.
    pub checksum: String,

    pub states: Vec<PipelineState>,
}

/// Terminal result of [`Bundler::run`](super::Bundler::run).
#[derive(Debug)]
pub enum BuildOutcome {
    Success(BundledArtifact),
    /// Dependency installation was canceled; no archive was written.
    Canceled,
    /// A stage failed; carries the summarized message.
    Failed(String),
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success(_))
    }

    pub fn artifact(&self) -> Option<&BundledArtifact> {
        match self {
            BuildOutcome::Success(artifact) => Some(artifact),
            _ => None,
        }
    }
}
