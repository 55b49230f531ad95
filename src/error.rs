//! Error types for the command line layer.
//!
//! Library failures arrive as [`crate::bundler::Error`]; this module wraps
//! them together with the errors of loading and saving parameter profiles.

use thiserror::Error;

/// Result type alias for command line operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for the binary
#[derive(Error, Debug)]
pub enum BundlerError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Generic errors from anyhow
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error;

        match self {
            BundlerError::Bundler(e) => match e.root() {
                Error::ToolNotFound { name, .. } => vec![
                    format!("Install {name} or add it to PATH"),
                    "Pass --python with the interpreter that should run pip".to_string(),
                ],
                Error::ExternalProcess { .. } => vec![
                    "Check the package manager output above".to_string(),
                    "Use --index-url to select a different package index".to_string(),
                ],
                Error::Validation(_) => {
                    vec!["Run with --help to see every parameter".to_string()]
                }
                _ => vec![],
            },
            BundlerError::Toml(_) | BundlerError::Json(_) | BundlerError::Anyhow(_) => {
                vec!["Check the profile file for syntax errors".to_string()]
            }
            _ => vec![],
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BundlerError::Bundler(e) if e.is_canceled() => crate::cli::EXIT_CANCELED,
            BundlerError::Bundler(crate::bundler::Error::Validation(_)) => {
                crate::cli::EXIT_INVALID
            }
            _ => crate::cli::EXIT_FAILURE,
        }
    }
}
