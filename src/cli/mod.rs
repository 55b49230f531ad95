//! Command line interface for the zipapp bundler.
//!
//! Resolves the parameter layers into [`Settings`](crate::bundler::Settings),
//! runs the [`Bundler`] with terminal output, and maps the outcome to a
//! process exit code. Ctrl-C cancels an in-progress dependency install.

mod args;
mod output;
pub mod profile;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::bundler::{BuildOutcome, Bundler, Error};
use crate::error::Result;
use profile::Profile;
use tokio_util::sync::CancellationToken;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// Parameters failed validation; nothing was built.
pub const EXIT_INVALID: i32 = 2;
pub const EXIT_CANCELED: i32 = 130;

const INTERRUPT_NOTICE: &str =
    "Interrupt received, canceling dependency installation if it is running";
const IGNORED_INTERRUPT: &str =
    "Interrupt ignored: only dependency installation can be canceled";

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let config = RuntimeConfig::from(&args);

    let profile = resolve_profile(&args)?;

    if let Some(path) = &args.save_profile {
        profile.save(path)?;
        config.success(&format!("Parameters saved to {}", path.display()))?;
    }

    if args.print_config {
        print!("{}", profile.to_toml()?);
        return Ok(EXIT_SUCCESS);
    }

    let settings = match profile.to_builder().build() {
        Ok(settings) => settings,
        Err(Error::Validation(errors)) => {
            config.error("Invalid parameters:")?;
            for (field, message) in errors.iter() {
                config.indent(&format!("{field}: {message}"))?;
            }
            return Ok(EXIT_INVALID);
        }
        Err(e) => return Err(e.into()),
    };

    config.verbose_println(&format!("Source:  {}", settings.source_dir().display()))?;
    config.verbose_println(&format!("Staging: {}", settings.staging_dir().display()))?;
    config.verbose_println(&format!("Target:  {}", settings.target_path().display()))?;

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_ctrl_c(cancel.clone(), *config.output()));

    let outcome = Bundler::new(settings).run(&cancel, config.output()).await;
    interrupt.abort();

    if let Some(note) = ignored_interrupt(&outcome, cancel.is_cancelled()) {
        config.warn(note)?;
    }

    Ok(match outcome {
        BuildOutcome::Success(artifact) => {
            if let Some(launcher) = &artifact.launcher {
                config.verbose_println(&format!("Launcher: {}", launcher.display()))?;
            }
            EXIT_SUCCESS
        }
        BuildOutcome::Canceled => EXIT_CANCELED,
        BuildOutcome::Failed(_) => EXIT_FAILURE,
    })
}

/// Built-in defaults, user defaults, project profile, then flags.
fn resolve_profile(args: &Args) -> Result<Profile> {
    let mut profile = args.base_profile();

    if let Some(user) = profile::load_user_defaults(args.defaults_file.as_deref())? {
        profile = profile.merge(user);
    }
    if let Some(path) = &args.profile {
        profile = profile.merge(Profile::load(path)?);
    }

    Ok(args.apply_to(profile))
}

/// Warning for an interrupt that arrived but did not cancel the build.
fn ignored_interrupt(outcome: &BuildOutcome, interrupted: bool) -> Option<&'static str> {
    (interrupted && !matches!(outcome, BuildOutcome::Canceled)).then_some(IGNORED_INTERRUPT)
}

async fn cancel_on_ctrl_c(cancel: CancellationToken, output: OutputManager) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            log::info!("Interrupt received");
            if let Err(e) = output.warn(INTERRUPT_NOTICE) {
                log::debug!("Failed to write status line: {e}");
            }
            cancel.cancel();
        }
        Err(e) => log::warn!("Failed to listen for Ctrl-C: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_outside_dependency_install_is_reported() {
        let built = BuildOutcome::Success(crate::bundler::BundledArtifact {
            path: "proj.pyz".into(),
            launcher: None,
            size: 0,
            checksum: String::new(),
            states: Vec::new(),
        });
        assert_eq!(ignored_interrupt(&built, true), Some(IGNORED_INTERRUPT));

        let failed = BuildOutcome::Failed("boom".into());
        assert_eq!(ignored_interrupt(&failed, true), Some(IGNORED_INTERRUPT));
        assert_eq!(ignored_interrupt(&failed, false), None);
        assert_eq!(ignored_interrupt(&BuildOutcome::Canceled, true), None);
    }
}
