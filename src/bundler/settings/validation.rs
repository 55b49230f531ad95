//! Per-field validation of a build request.

use super::{DIST_DIR, MAIN_FILE, SOURCE_PLACEHOLDER, SettingsBuilder};
use crate::bundler::{exclude::ExcludeSet, zipapp::EntryPoint};
use std::{
    collections::BTreeMap,
    path::{Component, Path},
};

/// Validation failures keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    /// Records a failure; the first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// `(field, message)` pairs sorted by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "  {field}: {message}")?;
        }
        Ok(())
    }
}

pub(super) fn validate(request: &SettingsBuilder) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    let source = request
        .source
        .as_deref()
        .filter(|s| !s.as_os_str().is_empty());
    let source = match source {
        None => {
            errors.add("source", "source directory is required");
            None
        }
        Some(dir) if !dir.is_dir() => {
            errors.add("source", format!("source directory not found: {}", dir.display()));
            None
        }
        Some(dir) => Some(dir),
    };

    if let Some(source) = source {
        validate_entry(request, source, &mut errors);
        validate_target(request, source, &mut errors);

        if let Some(requirements) = &request.requirements {
            let manifest = source.join(requirements);
            if !manifest.is_file() {
                errors.add(
                    "requirements",
                    format!("requirements file not found: {}", manifest.display()),
                );
            }
        }
    }

    if request.shebang.contains(['\n', '\r']) {
        errors.add("shebang", "interpreter line must be a single line");
    }

    if request.python.trim().is_empty() {
        errors.add("host_py", "package manager interpreter is required");
    }

    let index_url = request.index_url.trim();
    if !index_url.is_empty()
        && let Err(e) = url::Url::parse(index_url)
    {
        errors.add("pip_index_url", format!("invalid package index URL: {e}"));
    }

    if request.launcher && request.launcher_python.trim().is_empty() {
        errors.add(
            "start_script_py",
            "launcher interpreter command is required when a launcher is requested",
        );
    }

    if let Err(e) = ExcludeSet::new(&request.exclude_from_copy) {
        errors.add("exclude_from_copy", e.to_string());
    }
    if let Err(e) = ExcludeSet::new(&request.exclude_from_packaging) {
        errors.add("exclude_from_packaging", e.to_string());
    }

    errors
}

fn validate_entry(request: &SettingsBuilder, source: &Path, errors: &mut ValidationErrors) {
    let entry = request.entry.trim();
    let has_main = source.join(MAIN_FILE).is_file();

    if request.self_extract {
        if has_main {
            errors.add(
                "self_extract",
                format!("{MAIN_FILE} is not allowed in the source when self-extracting"),
            );
        }
        if entry.is_empty() || !is_relative_inside(Path::new(entry)) || !source.join(entry).is_file() {
            errors.add(
                "entry",
                "a valid entry file inside the source is required when self-extracting",
            );
        }
        return;
    }

    if entry.is_empty() {
        if !has_main {
            errors.add(
                "entry",
                format!("entry point is required when the source has no {MAIN_FILE}"),
            );
        }
    } else if source.join(entry).is_file() || EntryPoint::parse(entry).is_none() {
        errors.add(
            "entry",
            format!("invalid entry point `{entry}`, expected `pkg.module:function`"),
        );
    } else if has_main {
        errors.add(
            "entry",
            format!("an entry point cannot be given when the source already has {MAIN_FILE}"),
        );
    }
}

fn validate_target(request: &SettingsBuilder, source: &Path, errors: &mut ValidationErrors) {
    let template = request.target.trim();
    if template.is_empty() {
        return;
    }

    let source_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let resolved = template.replace(SOURCE_PLACEHOLDER, &source_name);
    let resolved = Path::new(&resolved);

    if !is_relative_inside(resolved) {
        errors.add(
            "target",
            format!("target must be a relative name inside {DIST_DIR}"),
        );
    } else if first_component(resolved).is_some_and(|first| first == source_name.as_str()) {
        errors.add("target", "target must not be placed in the staging directory");
    }
}

fn first_component(path: &Path) -> Option<&std::ffi::OsStr> {
    path.components().find_map(|c| match c {
        Component::Normal(part) => Some(part),
        _ => None,
    })
}

/// Relative, non-empty, and never climbing out with `..`.
fn is_relative_inside(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
