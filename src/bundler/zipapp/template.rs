//! Templates for generated files.

use crate::bundler::error::{Error, Result};
use handlebars::Handlebars;
use std::collections::BTreeMap;

/// Renders `template` with `data`, without HTML escaping.
pub fn render(name: &str, template: &str, data: &BTreeMap<&str, String>) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string(name, template)
        .map_err(|e| Error::Template(format!("failed to register {} template: {}", name, e)))?;

    handlebars
        .render(name, data)
        .map_err(|e| Error::Template(format!("failed to render {} template: {}", name, e)))
}

/// Self-extracting entry module written into the staged root.
///
/// Variables: `entry_literal` (Python string literal of the entry file,
/// relative to the archive root, `/`-separated).
pub const BOOTSTRAP_TEMPLATE: &str = r#"# -*- coding: utf-8 -*-
# Generated by zipapp_bundler: extracts this archive, then runs the entry file.
import atexit
import os
import runpy
import shutil
import sys
import tempfile
import zipfile

ENTRY_FILE = {{entry_literal}}


def _archive_path():
    archive = getattr(globals().get("__loader__"), "archive", None)
    return os.path.abspath(archive or sys.argv[0])


def main():
    archive_path = _archive_path()
    extract_dir = tempfile.mkdtemp(prefix="zipapp-")
    atexit.register(shutil.rmtree, extract_dir, ignore_errors=True)

    with zipfile.ZipFile(archive_path) as archive:
        archive.extractall(extract_dir)

    entry = os.path.join(extract_dir, *ENTRY_FILE.split("/"))
    sys.path = [p for p in sys.path if os.path.abspath(p) != archive_path]
    sys.path.insert(0, extract_dir)
    entry_dir = os.path.dirname(entry)
    if entry_dir != extract_dir:
        sys.path.insert(0, entry_dir)

    sys.argv[0] = entry
    runpy.run_path(entry, run_name="__main__")
"#;

/// Windows desktop launcher that starts the archive without a console.
///
/// Variables: `python` (interpreter command, VBScript-escaped) and
/// `zipapp_file` (archive file name, VBScript-escaped).
pub const LAUNCHER_TEMPLATE: &str = r#"' Generated by zipapp_bundler.
Option Explicit

Dim shell, fso, scriptDir, archive
Set shell = CreateObject("WScript.Shell")
Set fso = CreateObject("Scripting.FileSystemObject")

scriptDir = fso.GetParentFolderName(WScript.ScriptFullName)
archive = fso.BuildPath(scriptDir, "{{zipapp_file}}")

shell.CurrentDirectory = scriptDir
shell.Run "{{python}} """ & archive & """", 0, False
"#;
