//! Main bundler orchestration.
//!
//! This module provides the [`Bundler`] orchestrator that runs the zipapp
//! stages in order and maps the result onto a [`BuildOutcome`].

use super::{
    checksum::calculate_sha256,
    outcome::{BuildOutcome, BundledArtifact, PipelineState},
};
use crate::bundler::{
    Error, Result, Settings,
    error::{Context, ErrorExt},
    status::StatusSink,
    zipapp::{
        EntryPoint,
        archive::{ArchiveOptions, create_archive},
        bootstrap::create_bootstrap,
        cleanup::cleanup_dependencies,
        deps::{PipInstall, install_dependencies, resolve_manifest},
        launcher::create_launcher_script,
        staging::stage_source_tree,
    },
};
use tokio_util::sync::CancellationToken;

/// Process output lines repeated in a failure summary.
const OUTPUT_TAIL_LINES: usize = 5;

/// Main bundler orchestrator.
///
/// Runs, strictly in sequence: staging, dependency installation, dependency
/// cleanup, bootstrap generation, archive assembly and launcher generation.
/// The optional stages are skipped according to [`Settings`]. Any stage
/// failure stops the pipeline; a launcher failure only produces a warning.
///
/// # Examples
///
/// ```no_run
/// use zipapp_bundler::bundler::{BuildOutcome, Bundler, SettingsBuilder};
/// use zipapp_bundler::bundler::status::RecordingSink;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> zipapp_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .source("my_project")
///     .entry("app.cli:main")
///     .build()?;
///
/// let sink = RecordingSink::new();
/// match Bundler::new(settings).run(&CancellationToken::new(), &sink).await {
///     BuildOutcome::Success(artifact) => println!("Created {}", artifact.path.display()),
///     BuildOutcome::Canceled => println!("Canceled"),
///     BuildOutcome::Failed(message) => eprintln!("{message}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    settings: Settings,
}

impl Bundler {
    /// Creates a new bundler with validated settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs the pipeline and reports a terminal status line.
    ///
    /// Never returns an error: failures become [`BuildOutcome::Failed`]
    /// with a one-paragraph summary, and cancellation during dependency
    /// installation becomes [`BuildOutcome::Canceled`].
    pub async fn run(&self, cancel: &CancellationToken, status: &dyn StatusSink) -> BuildOutcome {
        match self.bundle(cancel, status).await {
            Ok(artifact) => {
                status.success(&format!(
                    "Created {} ({} bytes, sha256 {})",
                    artifact.path.display(),
                    artifact.size,
                    artifact.checksum
                ));
                BuildOutcome::Success(artifact)
            }
            Err(e) if e.is_canceled() => {
                log::info!("Build canceled");
                status.warn("Dependency installation canceled by user");
                BuildOutcome::Canceled
            }
            Err(e) => {
                log::error!("Build failed: {e:?}");
                let message = summarize(&e);
                status.error(&message);
                BuildOutcome::Failed(message)
            }
        }
    }

    /// Runs every stage, returning the artifact or the first error.
    pub async fn bundle(
        &self,
        cancel: &CancellationToken,
        status: &dyn StatusSink,
    ) -> Result<BundledArtifact> {
        let settings = &self.settings;
        let staging = settings.staging_dir();
        let mut states = Vec::new();

        status.info("Copying source tree...");
        let copy_excludes = settings.copy_excludes()?;
        stage_source_tree(settings.source_dir(), &staging, &copy_excludes)
            .await
            .context("staging source tree")?;
        status.success(&format!("Source tree copied to {}", staging.display()));
        transition(&mut states, PipelineState::Staged);

        match resolve_manifest(settings, &staging) {
            Some(manifest) => {
                let install = PipInstall {
                    python: settings.python(),
                    manifest: &manifest,
                    target_dir: &staging,
                    index_url: settings.index_url(),
                };
                install_dependencies(&install, cancel, status)
                    .await
                    .context("installing dependencies")?;
                transition(&mut states, PipelineState::DepsInstalled);

                if settings.cleanup_dependencies() {
                    cleanup_dependencies(&staging, status)
                        .await
                        .context("cleaning up dependencies")?;
                    transition(&mut states, PipelineState::Cleaned);
                } else {
                    transition(&mut states, PipelineState::CleanSkipped);
                }
            }
            None => {
                status.info("No requirements file found, skipping dependency installation");
                transition(&mut states, PipelineState::DepsSkipped);
                transition(&mut states, PipelineState::CleanSkipped);
            }
        }

        let entry = if settings.self_extract() {
            let entry_file = settings
                .entry()
                .context("an entry file is required for a self-extracting archive")?;
            status.info("Generating self-extracting bootstrap...");
            let shim = create_bootstrap(&staging, entry_file)
                .await
                .context("creating bootstrap")?;
            transition(&mut states, PipelineState::Bootstrapped);
            Some(shim.entry_point())
        } else {
            transition(&mut states, PipelineState::BootstrapSkipped);
            match settings.entry() {
                Some(raw) => Some(EntryPoint::parse(raw).ok_or_else(|| {
                    Error::GenericError(format!("invalid entry point `{raw}`"))
                })?),
                None => None,
            }
        };

        let target = settings.target_path();
        status.info(&format!("Creating archive {}...", target.display()));
        create_archive(ArchiveOptions {
            source: staging.clone(),
            target: target.clone(),
            interpreter: settings.shebang().to_string(),
            entry,
            compressed: settings.compressed(),
            excludes: settings.package_excludes().clone(),
        })
        .await
        .context("creating archive")?;
        transition(&mut states, PipelineState::Assembled);

        let size = tokio::fs::metadata(&target)
            .await
            .fs_context("reading artifact metadata", &target)?
            .len();
        let checksum = calculate_sha256(&target).await?;

        let launcher = if settings.launcher() {
            match create_launcher_script(&target, settings.launcher_python()).await {
                Ok(path) => {
                    status.success(&format!("Launcher script created: {}", path.display()));
                    transition(&mut states, PipelineState::LauncherWritten);
                    Some(path)
                }
                Err(e) => {
                    log::warn!("Launcher generation failed: {e:?}");
                    status.warn(&format!("Failed to create launcher script: {e}"));
                    transition(&mut states, PipelineState::LauncherSkipped);
                    None
                }
            }
        } else {
            transition(&mut states, PipelineState::LauncherSkipped);
            None
        };

        transition(&mut states, PipelineState::Done);

        Ok(BundledArtifact {
            path: target,
            launcher,
            size,
            checksum,
            states,
        })
    }
}

fn transition(states: &mut Vec<PipelineState>, state: PipelineState) {
    log::debug!("Pipeline state: {:?}", state);
    states.push(state);
}

/// One message for the user: the error chain, plus the last lines the
/// package manager printed when it was the one that failed.
fn summarize(error: &Error) -> String {
    let mut message = error.to_string();

    if let Error::ExternalProcess { output, .. } = error.root() {
        let tail: Vec<&str> = output
            .iter()
            .map(|line| line.trim_end())
            .filter(|line| !line.is_empty())
            .collect();
        let start = tail.len().saturating_sub(OUTPUT_TAIL_LINES);
        if start < tail.len() {
            message.push('\n');
            message.push_str(&tail[start..].join("\n"));
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_carries_output_tail() {
        let error = Error::Context(
            "installing dependencies".into(),
            Box::new(Error::ExternalProcess {
                command: "python3 -m pip install".into(),
                code: Some(1),
                output: (1..=8).map(|i| format!("line {i}")).collect(),
            }),
        );

        let message = summarize(&error);
        assert!(message.starts_with("installing dependencies: `python3 -m pip install` exited"));
        assert!(message.ends_with("line 4\nline 5\nline 6\nline 7\nline 8"));
        assert!(!message.contains("line 3"));
    }
}
