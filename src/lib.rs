//! Python zipapp bundler.
//!
//! Packages a Python source tree and its pip dependencies into a single
//! `.pyz` archive, optionally self-extracting and with a desktop launcher.
//!
//! It can be used both as a CLI tool and as a library dependency; the
//! library lives in [`bundler`].

pub mod bundler;
pub mod cli;
pub mod error;

// Re-export commonly used types
pub use error::{BundlerError, Result};
