//! Command line argument parsing.
//!
//! Every build parameter has a flag. Flags form the top layer of the
//! parameter profile (see [`super::profile`]), so an unset flag leaves the
//! value from the lower layers untouched.

use super::profile::Profile;
use crate::bundler::settings::{
    DEFAULT_COPY_EXCLUDE_PATTERNS, DEFAULT_ENTRY_POINT, DEFAULT_PACKAGING_EXCLUDE_PATTERNS,
};
use clap::Parser;
use std::path::PathBuf;

/// Packages a Python project into an executable zipapp
#[derive(Parser, Debug)]
#[command(
    name = "zipapp_bundler",
    version,
    about = "Packages a Python project into an executable zipapp (.pyz)",
    long_about = "Copies a Python source tree into <SOURCE>/zipapp_dist, installs the packages listed in its
requirements file next to the code, and writes a single .pyz archive the Python runtime can run.

Usage:
  zipapp_bundler --source ./myapp --entry myapp.cli:main
  zipapp_bundler --source ./myapp --self-extract --entry main.py --launcher
  zipapp_bundler --profile build.toml --index-url https://pypi.org/simple

Exit codes: 0 success, 1 failure, 2 invalid parameters, 130 canceled."
)]
pub struct Args {
    /// Python project directory to package
    #[arg(short = 's', long, value_name = "DIR", env = "ZIPAPP_SOURCE")]
    pub source: Option<PathBuf>,

    /// Entry point (`pkg.module:function`), or the entry file with --self-extract
    #[arg(short = 'e', long, value_name = "ENTRY")]
    pub entry: Option<String>,

    /// Archive name inside zipapp_dist; `{SOURCE}` is replaced by the project directory name
    #[arg(short = 't', long, value_name = "NAME")]
    pub target: Option<String>,

    /// Interpreter line written at the start of the archive (empty for none)
    #[arg(long, value_name = "LINE", allow_hyphen_values = true)]
    pub shebang: Option<String>,

    /// Store files without compression
    #[arg(long)]
    pub no_compress: bool,

    /// Pattern left out when copying the source tree (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub exclude_from_copy: Vec<String>,

    /// Pattern left out of the archive (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub exclude_from_packaging: Vec<String>,

    /// Start from empty exclusion lists instead of the built-in ones
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Interpreter used to run pip
    #[arg(long, value_name = "PYTHON", env = "ZIPAPP_PYTHON")]
    pub python: Option<String>,

    /// Requirements file, relative to the source directory
    #[arg(short = 'r', long, value_name = "FILE")]
    pub requirements: Option<PathBuf>,

    /// Package index URL passed to pip
    #[arg(long, value_name = "URL", env = "ZIPAPP_INDEX_URL")]
    pub index_url: Option<String>,

    /// Keep .dist-info directories and bytecode caches of installed packages
    #[arg(long)]
    pub no_cleanup: bool,

    /// Extract the archive to a temporary directory before running it
    #[arg(long)]
    pub self_extract: bool,

    /// Also write a .vbs launcher next to the archive
    #[arg(long)]
    pub launcher: bool,

    /// Interpreter command written into the launcher
    #[arg(long, value_name = "PYTHON")]
    pub launcher_python: Option<String>,

    /// Load parameters from a TOML or JSON profile
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// User defaults file (default: <config dir>/zipapp_bundler/defaults.toml)
    #[arg(long, value_name = "FILE", env = "ZIPAPP_BUNDLER_DEFAULTS")]
    pub defaults_file: Option<PathBuf>,

    /// Save the effective parameters to a TOML or JSON profile
    #[arg(long, value_name = "FILE")]
    pub save_profile: Option<PathBuf>,

    /// Print the effective parameters as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print diagnostic detail
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Built-in defaults, with empty exclusion lists if requested.
    pub fn base_profile(&self) -> Profile {
        let mut base = Profile::defaults();
        if self.no_default_excludes {
            base.exclude_from_copy = Some(Vec::new());
            base.exclude_from_packaging = Some(Vec::new());
        }
        base
    }

    /// The flag layer.
    ///
    /// Exclusion flags are not part of it: they append to the lower layers
    /// rather than replacing them (see [`Args::apply_to`]).
    pub fn overrides(&self) -> Profile {
        Profile {
            source: self.source.clone(),
            entry: self.entry.clone(),
            target: self.target.clone(),
            shebang: self.shebang.clone(),
            compressed: self.no_compress.then_some(false),
            exclude_from_copy: None,
            exclude_from_packaging: None,
            host_py: self.python.clone(),
            requirements: self.requirements.clone(),
            pip_index_url: self.index_url.clone(),
            cleanup_dependencies: self.no_cleanup.then_some(false),
            self_extract: self.self_extract.then_some(true),
            start_script: self.launcher.then_some(true),
            start_script_py: self.launcher_python.clone(),
        }
    }

    /// Puts the flags on top of `lower`.
    pub fn apply_to(&self, lower: Profile) -> Profile {
        let mut profile = lower.merge(self.overrides());

        if !self.exclude_from_copy.is_empty() {
            profile
                .exclude_from_copy
                .get_or_insert_with(|| to_strings(DEFAULT_COPY_EXCLUDE_PATTERNS))
                .extend(self.exclude_from_copy.iter().cloned());
        }
        if !self.exclude_from_packaging.is_empty() {
            profile
                .exclude_from_packaging
                .get_or_insert_with(|| to_strings(DEFAULT_PACKAGING_EXCLUDE_PATTERNS))
                .extend(self.exclude_from_packaging.iter().cloned());
        }

        if profile.self_extract == Some(true) && profile.entry.is_none() {
            profile.entry = Some(DEFAULT_ENTRY_POINT.to_string());
        }

        profile
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet);

        Self { output }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print error message
    pub fn error(&self, message: &str) -> std::io::Result<()> {
        self.output.error(message)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("zipapp_bundler").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn unset_flags_keep_lower_layers() {
        let args = parse(&["--entry", "app:main"]);
        let lower = Profile {
            target: Some("custom.pyz".into()),
            compressed: Some(false),
            ..Profile::defaults()
        };

        let profile = args.apply_to(lower);
        assert_eq!(profile.entry.as_deref(), Some("app:main"));
        assert_eq!(profile.target.as_deref(), Some("custom.pyz"));
        assert_eq!(profile.compressed, Some(false));
    }

    #[test]
    fn exclusion_flags_append() {
        let args = parse(&["--exclude-from-packaging", "*.log", "--exclude-from-packaging", "tests/"]);
        let profile = args.apply_to(args.base_profile());
        let patterns = profile.exclude_from_packaging.unwrap();
        assert!(patterns.contains(&"requirements.txt".to_string()));
        assert_eq!(&patterns[patterns.len() - 2..], ["*.log", "tests/"]);
    }

    #[test]
    fn no_default_excludes_starts_empty() {
        let args = parse(&["--no-default-excludes", "--exclude-from-copy", "*.tmp"]);
        let profile = args.apply_to(args.base_profile());
        assert_eq!(profile.exclude_from_copy, Some(vec!["*.tmp".to_string()]));
        assert_eq!(profile.exclude_from_packaging, Some(vec![]));
    }

    #[test]
    fn self_extract_defaults_entry_file() {
        let args = parse(&["--self-extract"]);
        let profile = args.apply_to(args.base_profile());
        assert_eq!(profile.self_extract, Some(true));
        assert_eq!(profile.entry.as_deref(), Some("main.py"));
    }

    #[test]
    fn negative_flags_map_to_false() {
        let profile = parse(&["--no-compress", "--no-cleanup"]).overrides();
        assert_eq!(profile.compressed, Some(false));
        assert_eq!(profile.cleanup_dependencies, Some(false));
        assert_eq!(profile.self_extract, None);
    }
}
