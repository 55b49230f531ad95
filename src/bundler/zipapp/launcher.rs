//! Launcher generator: a VBScript that starts the archive on Windows
//! desktops without opening a console window.

use super::template::{LAUNCHER_TEMPLATE, render};
use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub const LAUNCHER_EXTENSION: &str = "vbs";

/// `<archive stem>.vbs` beside the archive.
pub fn launcher_path(archive: &Path) -> PathBuf {
    archive.with_extension(LAUNCHER_EXTENSION)
}

/// Renders the launcher for `file_name` run by `python`.
pub fn render_launcher(python: &str, file_name: &str) -> Result<String> {
    let mut data = BTreeMap::new();
    data.insert("python", vbs_escape(python.trim()));
    data.insert("zipapp_file", vbs_escape(file_name));
    render("launcher", LAUNCHER_TEMPLATE, &data)
}

/// Writes the launcher next to `archive` and returns its path.
pub async fn create_launcher_script(archive: &Path, python: &str) -> Result<PathBuf> {
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::GenericError(format!("invalid archive path {}", archive.display())))?;

    let script = render_launcher(python, &file_name)?;
    let path = launcher_path(archive);
    tokio::fs::write(&path, script)
        .await
        .fs_context("writing launcher script", &path)?;

    log::debug!("Wrote launcher {}", path.display());
    Ok(path)
}

/// Quotes are doubled inside VBScript string literals.
fn vbs_escape(value: &str) -> String {
    value.replace('"', "\"\"")
}
