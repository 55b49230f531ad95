//! Core Settings struct and implementations.

use super::{DIST_DIR, SOURCE_PLACEHOLDER};
use crate::bundler::exclude::ExcludeSet;
use std::path::{Path, PathBuf};

/// A validated build request.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder); every path
/// and pattern in here has already been checked, so the pipeline only has
/// to re-assert invariants that can change between validation and use
/// (files on disk).
///
/// # Examples
///
/// ```no_run
/// use zipapp_bundler::bundler::SettingsBuilder;
///
/// # fn example() -> zipapp_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .source("my_project")
///     .entry("app.cli:main")
///     .launcher(true)
///     .build()?;
/// println!("archive: {}", settings.target_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Absolute source directory.
    source: PathBuf,

    /// Entry specifier (`pkg.mod:fn`), or entry file when self-extracting.
    entry: Option<String>,

    /// Archive file name template, relative to the dist root.
    target_template: String,

    /// Interpreter line written at the head of the archive.
    shebang: String,

    compressed: bool,

    /// Patterns applied while staging. Does not include the implicit
    /// dist directory entry, see [`Settings::copy_excludes`].
    copy_excludes: ExcludeSet,

    package_excludes: ExcludeSet,

    /// Explicit manifest; `None` means the staged default.
    requirements: Option<PathBuf>,

    /// Interpreter used to run the package manager.
    python: String,

    index_url: Option<String>,

    cleanup_dependencies: bool,

    self_extract: bool,

    launcher: bool,

    launcher_python: String,
}

impl Settings {
    /// Absolute source directory.
    pub fn source_dir(&self) -> &Path {
        &self.source
    }

    /// Base name of the source directory.
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `<source>/zipapp_dist`.
    pub fn dist_root(&self) -> PathBuf {
        self.source.join(DIST_DIR)
    }

    /// `<source>/zipapp_dist/<source-name>`, rebuilt on every run.
    pub fn staging_dir(&self) -> PathBuf {
        self.dist_root().join(self.source_name())
    }

    /// Target file name with the source placeholder substituted.
    pub fn target_name(&self) -> String {
        self.target_template
            .replace(SOURCE_PLACEHOLDER, &self.source_name())
    }

    /// Final archive path, always under the dist root.
    pub fn target_path(&self) -> PathBuf {
        self.dist_root().join(self.target_name())
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn shebang(&self) -> &str {
        &self.shebang
    }

    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// Copy-time exclusions, including the dist directory itself so a
    /// build never copies its own previous output.
    pub fn copy_excludes(&self) -> crate::bundler::Result<ExcludeSet> {
        self.copy_excludes.clone().with(DIST_DIR)
    }

    pub fn package_excludes(&self) -> &ExcludeSet {
        &self.package_excludes
    }

    /// Explicit manifest resolved against the source directory.
    pub fn requirements(&self) -> Option<PathBuf> {
        self.requirements.as_ref().map(|r| self.source.join(r))
    }

    pub fn python(&self) -> &str {
        &self.python
    }

    pub fn index_url(&self) -> Option<&str> {
        self.index_url.as_deref()
    }

    pub fn cleanup_dependencies(&self) -> bool {
        self.cleanup_dependencies
    }

    pub fn self_extract(&self) -> bool {
        self.self_extract
    }

    pub fn launcher(&self) -> bool {
        self.launcher
    }

    pub fn launcher_python(&self) -> &str {
        &self.launcher_python
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        source: PathBuf,
        entry: Option<String>,
        target_template: String,
        shebang: String,
        compressed: bool,
        copy_excludes: ExcludeSet,
        package_excludes: ExcludeSet,
        requirements: Option<PathBuf>,
        python: String,
        index_url: Option<String>,
        cleanup_dependencies: bool,
        self_extract: bool,
        launcher: bool,
        launcher_python: String,
    ) -> Self {
        Self {
            source,
            entry,
            target_template,
            shebang,
            compressed,
            copy_excludes,
            package_excludes,
            requirements,
            python,
            index_url,
            cleanup_dependencies,
            self_extract,
            launcher,
            launcher_python,
        }
    }
}
