//! Error types for the packaging pipeline.
//!
//! Every stage returns [`Result`]. Filesystem failures carry the path and
//! the operation that failed (see [`ErrorExt::fs_context`]), external
//! process failures carry the command line and the captured output, and
//! cancellation is its own variant so callers can tell it apart from a
//! failure.

use super::settings::ValidationErrors;
use std::{fmt::Display, path::PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while validating a request or running the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The build request failed validation; no stage ran.
    #[error("invalid build parameters:\n{0}")]
    Validation(ValidationErrors),

    /// Dependency installation was canceled through the cancellation token.
    #[error("dependency installation canceled by user")]
    Canceled,

    /// The package manager exited unsuccessfully.
    #[error("`{command}` exited with {}", describe_exit(.code))]
    ExternalProcess {
        /// Command line that was executed.
        command: String,
        /// Exit code, `None` if terminated by a signal.
        code: Option<i32>,
        /// Combined stdout/stderr lines captured while the process ran.
        output: Vec<String>,
    },

    /// A command could not be spawned or waited on.
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Command line that was executed.
        command: String,
        /// Underlying error.
        error: std::io::Error,
    },

    /// A required executable could not be located.
    #[error("executable `{name}` not found: {reason}")]
    ToolNotFound {
        /// Name or path that was looked up.
        name: String,
        /// Why the lookup failed.
        reason: String,
    },

    /// Filesystem operation failed.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done.
        context: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        error: std::io::Error,
    },

    /// An exclusion pattern could not be compiled.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// Pattern as given.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Archive assembly failed.
    #[error("{0}")]
    Archive(String),

    /// Zip writer error, surfaced verbatim.
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    /// Template registration or rendering failed.
    #[error("template error: {0}")]
    Template(String),

    /// Directory traversal failed.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix could not be stripped.
    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// IO error without path context.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// An error with additional context.
    #[error("{0}: {1}")]
    Context(String, Box<Error>),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Returns true if this error, or the error it wraps, is a cancellation.
    pub fn is_canceled(&self) -> bool {
        match self {
            Error::Canceled => true,
            Error::Context(_, inner) => inner.is_canceled(),
            _ => false,
        }
    }

    /// Returns the innermost error, skipping context layers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context(_, inner) => inner.root(),
            other => other,
        }
    }
}

/// Attaches the failing path to IO errors.
pub trait ErrorExt<T> {
    /// Converts an IO error into [`Error::Fs`] with the given context and path.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Adds human-readable context to results and options.
pub trait Context<T> {
    /// Wraps the error (or `None`) with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Lazily evaluated variant of [`Context::context`].
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
