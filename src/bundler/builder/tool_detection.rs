//! External tool detection.
//!
//! Resolves the package manager interpreter before it is spawned so a
//! missing executable is reported by name instead of as a bare spawn error.

use crate::bundler::error::{Error, Result};
use std::path::PathBuf;

/// Locates `name` on `PATH`, or checks it directly when it is a path.
pub fn locate_executable(name: &str) -> Result<PathBuf> {
    match which::which(name) {
        Ok(path) => {
            log::debug!("Found {} at: {}", name, path.display());
            Ok(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", name, e);
            Err(Error::ToolNotFound {
                name: name.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
