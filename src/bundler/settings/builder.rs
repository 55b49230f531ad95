//! Builder for constructing Settings.

use super::{
    DEFAULT_COPY_EXCLUDE_PATTERNS, DEFAULT_HOST_INTERPRETER, DEFAULT_PACKAGING_EXCLUDE_PATTERNS,
    DEFAULT_SHEBANG, DEFAULT_TARGET_NAME, Settings, validation,
};
use crate::bundler::{
    error::{Error, ErrorExt, Result},
    exclude::ExcludeSet,
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// Starts from the same defaults the command line uses. Nothing is checked
/// until [`SettingsBuilder::build`], which validates every field and
/// returns [`Error::Validation`] listing each invalid one.
///
/// # Examples
///
/// ```no_run
/// use zipapp_bundler::bundler::SettingsBuilder;
///
/// # fn example() -> zipapp_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .source("my_project")
///     .entry("app.py")
///     .self_extract(true)
///     .requirements("requirements-prod.txt")
///     .index_url("https://pypi.org/simple")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    pub(super) source: Option<PathBuf>,
    pub(super) entry: String,
    pub(super) target: String,
    pub(super) shebang: String,
    pub(super) compressed: bool,
    pub(super) exclude_from_copy: Vec<String>,
    pub(super) exclude_from_packaging: Vec<String>,
    pub(super) requirements: Option<PathBuf>,
    pub(super) python: String,
    pub(super) index_url: String,
    pub(super) cleanup_dependencies: bool,
    pub(super) self_extract: bool,
    pub(super) launcher: bool,
    pub(super) launcher_python: String,
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self {
            source: None,
            entry: String::new(),
            target: DEFAULT_TARGET_NAME.to_string(),
            shebang: DEFAULT_SHEBANG.to_string(),
            compressed: true,
            exclude_from_copy: to_strings(DEFAULT_COPY_EXCLUDE_PATTERNS),
            exclude_from_packaging: to_strings(DEFAULT_PACKAGING_EXCLUDE_PATTERNS),
            requirements: None,
            python: DEFAULT_HOST_INTERPRETER.to_string(),
            index_url: String::new(),
            cleanup_dependencies: true,
            self_extract: false,
            launcher: false,
            launcher_python: DEFAULT_HOST_INTERPRETER.to_string(),
        }
    }
}

impl SettingsBuilder {
    /// Creates a builder populated with defaults.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project directory to package.
    ///
    /// # Required
    pub fn source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the entry specifier (`pkg.mod:fn`), or the entry file relative
    /// to the source when self-extracting.
    ///
    /// Default: empty (use the source's own `__main__.py`)
    pub fn entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    /// Sets the archive name template; `{SOURCE}` is replaced by the
    /// source directory name.
    ///
    /// Default: `{SOURCE}.pyz`
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Sets the interpreter line. An empty line writes no shebang.
    ///
    /// Default: `#!/usr/bin/env python3`
    pub fn shebang(mut self, shebang: impl Into<String>) -> Self {
        self.shebang = shebang.into();
        self
    }

    /// Default: true (deflate)
    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Replaces the copy-time exclusion patterns.
    pub fn exclude_from_copy<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_from_copy = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the packaging-time exclusion patterns.
    pub fn exclude_from_packaging<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_from_packaging = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the dependency manifest, relative to the source directory.
    ///
    /// Default: `requirements.txt` in the staged tree, if present
    pub fn requirements<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        self.requirements = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path.to_path_buf())
        };
        self
    }

    /// Sets the interpreter that runs the package manager.
    ///
    /// Default: `python3`
    pub fn python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    /// Sets the package index URL passed to the package manager.
    pub fn index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = url.into();
        self
    }

    /// Default: true
    pub fn cleanup_dependencies(mut self, cleanup: bool) -> Self {
        self.cleanup_dependencies = cleanup;
        self
    }

    /// Default: false
    pub fn self_extract(mut self, self_extract: bool) -> Self {
        self.self_extract = self_extract;
        self
    }

    /// Default: false
    pub fn launcher(mut self, launcher: bool) -> Self {
        self.launcher = launcher;
        self
    }

    /// Sets the interpreter command written into the launcher script.
    ///
    /// Default: `python3`
    pub fn launcher_python(mut self, python: impl Into<String>) -> Self {
        self.launcher_python = python.into();
        self
    }

    /// Validates the request and builds the settings.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] with one message per invalid field.
    pub fn build(self) -> Result<Settings> {
        let errors = validation::validate(&self);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let source = self.source.unwrap_or_default();
        let source = source
            .absolutize()
            .fs_context("resolving source directory", &source)?
            .into_owned();

        let target = match self.target.trim() {
            "" => DEFAULT_TARGET_NAME.to_string(),
            target => target.to_string(),
        };

        Ok(Settings::new(
            source,
            non_empty(&self.entry),
            target,
            self.shebang.trim().to_string(),
            self.compressed,
            ExcludeSet::new(&self.exclude_from_copy)?,
            ExcludeSet::new(&self.exclude_from_packaging)?,
            self.requirements,
            self.python.trim().to_string(),
            non_empty(&self.index_url),
            self.cleanup_dependencies,
            self.self_extract,
            self.launcher,
            self.launcher_python.trim().to_string(),
        ))
    }
}

fn non_empty(value: &str) -> Option<String> {
    match value.trim() {
        "" => None,
        value => Some(value.to_string()),
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
