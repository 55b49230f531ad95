//! Build request configuration.
//!
//! [`Settings`] is the immutable, validated parameter set a build runs
//! against. It is constructed with [`SettingsBuilder`], whose `build`
//! validates every field and reports all problems at once as
//! [`ValidationErrors`].

mod builder;
mod core;
mod validation;

pub use builder::SettingsBuilder;
pub use core::Settings;
pub use validation::ValidationErrors;

/// Directory, inside the source tree, that holds staging and output.
pub const DIST_DIR: &str = "zipapp_dist";

/// Placeholder replaced by the source directory's base name in target names.
pub const SOURCE_PLACEHOLDER: &str = "{SOURCE}";

pub const DEFAULT_TARGET_NAME: &str = "{SOURCE}.pyz";

/// Entry file assumed by the command line when self-extracting without `--entry`.
pub const DEFAULT_ENTRY_POINT: &str = "main.py";

pub const DEFAULT_SHEBANG: &str = "#!/usr/bin/env python3";

pub const DEFAULT_HOST_INTERPRETER: &str = "python3";

/// Manifest looked up inside the staged tree when none is given.
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// File the runtime executes first when running an archive.
pub const MAIN_FILE: &str = "__main__.py";

pub const DEFAULT_COPY_EXCLUDE_PATTERNS: &[&str] = &[
    "venv", ".venv", ".git", ".svn", ".hg", ".vscode", ".idea", "build", "dist",
];

pub const DEFAULT_PACKAGING_EXCLUDE_PATTERNS: &[&str] = &[
    "venv",
    ".venv",
    ".git",
    ".svn",
    ".hg",
    ".vscode",
    ".idea",
    "build/",
    "dist/",
    "poetry.lock",
    "pyproject.toml",
    "requirements.txt",
    "*.egg-info",
];
