//! Dependency resolver: installs the manifest's packages into the staged tree.
//!
//! The package manager runs as a child process with stdout and stderr piped.
//! One reader task per stream pushes lines into a single bounded channel,
//! which the calling task drains into the [`StatusSink`]. The same task
//! polls the [`CancellationToken`] every [`POLL_INTERVAL`]; on cancellation
//! the child gets a graceful terminate request, [`TERMINATE_GRACE`] to exit,
//! and is then killed.

use crate::bundler::{
    builder::locate_executable,
    error::{Error, Result},
    settings::{DEFAULT_MANIFEST, Settings},
    status::StatusSink,
};
use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::{Child, Command},
    sync::mpsc,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

/// How often cancellation and process exit are checked.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a terminated package manager gets before it is killed.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(1);

/// Capacity of the output line channel.
const LINE_BUFFER: usize = 256;

/// Picks the manifest to install from, if any.
///
/// An explicit manifest wins; otherwise `requirements.txt` inside the
/// staged tree is used when present. `None` means the stage is skipped.
pub fn resolve_manifest(settings: &Settings, staging: &Path) -> Option<PathBuf> {
    if let Some(explicit) = settings.requirements() {
        return Some(explicit);
    }

    let default = staging.join(DEFAULT_MANIFEST);
    default.is_file().then_some(default)
}

/// One `pip install --target` invocation.
#[derive(Debug, Clone)]
pub struct PipInstall<'a> {
    /// Interpreter that runs `-m pip`.
    pub python: &'a str,
    pub manifest: &'a Path,
    /// Directory the packages are installed into.
    pub target_dir: &'a Path,
    pub index_url: Option<&'a str>,
}

impl PipInstall<'_> {
    /// Arguments passed after the interpreter.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-m".to_string(),
            "pip".to_string(),
            "install".to_string(),
            "-r".to_string(),
            posix(self.manifest),
            "--target".to_string(),
            posix(self.target_dir),
        ];
        if let Some(url) = self.index_url {
            args.push("--index-url".to_string());
            args.push(url.to_string());
        }
        args
    }

    /// Shell-style rendering of the full command, for display.
    pub fn command_line(&self) -> String {
        std::iter::once(self.python.to_string())
            .chain(self.args())
            .map(|arg| quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs the package manager to completion, cancellation, or failure.
///
/// # Errors
///
/// - [`Error::Canceled`] if `cancel` fired; the child has exited or been
///   killed by the time this returns.
/// - [`Error::ExternalProcess`] on a non-zero exit, carrying the combined
///   output.
/// - [`Error::ToolNotFound`] / [`Error::CommandFailed`] if the interpreter
///   cannot be started.
pub async fn install_dependencies(
    install: &PipInstall<'_>,
    cancel: &CancellationToken,
    status: &dyn StatusSink,
) -> Result<()> {
    let program = locate_executable(install.python)?;
    let command = install.command_line();

    status.info("Installing dependencies...");
    status.output("");
    status.output(&command);
    status.output("");
    log::debug!("Spawning {} {:?}", program.display(), install.args());

    let mut child = Command::new(&program)
        .args(install.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|error| Error::CommandFailed {
            command: command.clone(),
            error,
        })?;

    let (tx, mut rx) = mpsc::channel::<String>(LINE_BUFFER);
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, tx.clone(), cancel.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, tx.clone(), cancel.clone()));
    }
    drop(tx);

    let mut captured = Vec::new();
    let mut streams_open = true;
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let exit = loop {
        tokio::select! {
            line = rx.recv(), if streams_open => match line {
                Some(line) => {
                    status.output(&line);
                    captured.push(line);
                }
                None => streams_open = false,
            },
            _ = ticker.tick() => {
                if cancel.is_cancelled() {
                    log::info!("Cancellation requested, stopping package manager");
                    terminate(&mut child).await;
                    return Err(Error::Canceled);
                }
                if !streams_open {
                    let exited = child.try_wait().map_err(|error| Error::CommandFailed {
                        command: command.clone(),
                        error,
                    })?;
                    if let Some(exit) = exited {
                        break exit;
                    }
                }
            }
        }
    };
    status.output("");

    if !exit.success() {
        log::warn!("Package manager failed: {exit}");
        return Err(Error::ExternalProcess {
            command,
            code: exit.code(),
            output: captured,
        });
    }

    status.success("Dependencies installed successfully");
    Ok(())
}

/// Pushes each line of `reader` into `tx` until EOF, channel close, or cancellation.
async fn forward_lines<R>(reader: R, tx: mpsc::Sender<String>, cancel: CancellationToken)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            read = reader.read_until(b'\n', &mut buf) => read,
        };

        match read {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                log::debug!("Stopped reading package manager output: {e}");
                break;
            }
        }
    }
}

/// Graceful terminate, bounded wait, then kill.
async fn terminate(child: &mut Child) {
    request_termination(child);

    let deadline = Instant::now() + TERMINATE_GRACE;
    while Instant::now() < deadline {
        match child.try_wait() {
            Ok(Some(exit)) => {
                log::debug!("Package manager exited after terminate request: {exit}");
                return;
            }
            Ok(None) => tokio::time::sleep(POLL_INTERVAL).await,
            Err(e) => {
                log::warn!("Failed to poll package manager: {e}");
                break;
            }
        }
    }

    log::warn!(
        "Package manager still running after {:?}, killing it",
        TERMINATE_GRACE
    );
    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill package manager: {e}");
    }
}

#[cfg(unix)]
fn request_termination(child: &mut Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return;
    };
    if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        log::warn!("Failed to send SIGTERM to {pid}: {e}");
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        log::warn!("Failed to terminate package manager: {e}");
    }
}

fn posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_pip_arguments() {
        let install = PipInstall {
            python: "python3",
            manifest: Path::new("/src/requirements.txt"),
            target_dir: Path::new("/src/zipapp_dist/src"),
            index_url: Some("https://mirror.example/simple"),
        };
        assert_eq!(
            install.args(),
            [
                "-m",
                "pip",
                "install",
                "-r",
                "/src/requirements.txt",
                "--target",
                "/src/zipapp_dist/src",
                "--index-url",
                "https://mirror.example/simple",
            ]
        );
    }

    #[test]
    fn command_line_quotes_arguments_with_spaces() {
        let install = PipInstall {
            python: "/opt/my python/bin/python",
            manifest: Path::new("req.txt"),
            target_dir: Path::new("out"),
            index_url: None,
        };
        assert_eq!(
            install.command_line(),
            "'/opt/my python/bin/python' -m pip install -r req.txt --target out"
        );
    }
}
