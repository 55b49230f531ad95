//! Bootstrap generator for self-extracting archives.
//!
//! Some programs cannot run from inside a zip (they open their own files
//! by path, or load native extensions). For those the archive's entry
//! point is a generated module that extracts the archive to a temporary
//! directory and runs the real entry file from there.

use super::{
    EntryPoint,
    template::{BOOTSTRAP_TEMPLATE, render},
};
use crate::{
    bail,
    bundler::{
        error::{Error, ErrorExt, Result},
        settings::MAIN_FILE,
    },
};
use std::{
    collections::BTreeMap,
    path::{Component, Path, PathBuf},
};

/// Module name of the generated shim.
pub const BOOTSTRAP_MODULE: &str = "_zipapp_bootstrap";

/// Function the archive's `__main__.py` calls.
const BOOTSTRAP_FUNCTION: &str = "main";

/// A generated bootstrap module inside the staged tree.
#[derive(Debug, Clone)]
pub struct BootstrapShim {
    path: PathBuf,
}

impl BootstrapShim {
    /// Where the shim was written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry point the archive must be built with.
    pub fn entry_point(&self) -> EntryPoint {
        EntryPoint::new(BOOTSTRAP_MODULE, Some(BOOTSTRAP_FUNCTION))
    }
}

/// Writes `_zipapp_bootstrap.py` into `staging` so that running the archive
/// extracts it and runs `entry_file`.
///
/// `entry_file` is relative to the staged root. The checks made at
/// validation time are repeated here against the staged tree, since
/// staging can drop files through exclusion patterns.
pub async fn create_bootstrap(staging: &Path, entry_file: &str) -> Result<BootstrapShim> {
    if staging.join(MAIN_FILE).exists() {
        bail!("{MAIN_FILE} is not allowed in a self-extracting archive");
    }

    let relative = Path::new(entry_file);
    let inside = !relative.as_os_str().is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !inside {
        bail!("entry file `{entry_file}` must be a relative path inside the source");
    }

    let entry_path = staging.join(relative);
    if !entry_path.is_file() {
        bail!("entry file not found in staged tree: {}", entry_path.display());
    }

    let path = staging.join(format!("{BOOTSTRAP_MODULE}.py"));
    if path.exists() {
        bail!("{} already exists in the source", path.display());
    }

    let source = render_bootstrap(relative)?;
    tokio::fs::write(&path, source)
        .await
        .fs_context("writing bootstrap module", &path)?;
    log::debug!("Wrote bootstrap for {} to {}", entry_file, path.display());

    Ok(BootstrapShim { path })
}

fn render_bootstrap(entry_file: &Path) -> Result<String> {
    let posix = entry_file
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    let literal = serde_json::to_string(&posix)
        .map_err(|e| Error::Template(format!("failed to encode entry file: {}", e)))?;

    let mut data = BTreeMap::new();
    data.insert("entry_literal", literal);
    render("bootstrap", BOOTSTRAP_TEMPLATE, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn entry_literal_is_quoted_and_slash_separated() {
        let source = render_bootstrap(Path::new("./src/app \"x\".py")).unwrap();
        assert!(source.contains(r#"ENTRY_FILE = "src/app \"x\".py""#));
        assert!(source.contains("runpy.run_path(entry, run_name=\"__main__\")"));
    }

    #[tokio::test]
    async fn writes_shim_and_rewrites_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.py"), "print('hi')\n").unwrap();

        let shim = create_bootstrap(dir.path(), "app.py").await.unwrap();
        assert_eq!(shim.path(), dir.path().join("_zipapp_bootstrap.py"));
        assert_eq!(shim.entry_point().to_string(), "_zipapp_bootstrap:main");
        assert!(fs::read_to_string(shim.path()).unwrap().contains("def main():"));
    }

    #[tokio::test]
    async fn rejects_main_file_and_escaping_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.py"), "").unwrap();

        assert!(create_bootstrap(dir.path(), "../app.py").await.is_err());
        assert!(create_bootstrap(dir.path(), "missing.py").await.is_err());

        fs::write(dir.path().join("__main__.py"), "").unwrap();
        assert!(create_bootstrap(dir.path(), "app.py").await.is_err());
        assert!(!dir.path().join("_zipapp_bootstrap.py").exists());
    }
}
