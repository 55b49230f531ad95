//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// Name of the project directory created inside each fixture.
pub const PROJECT: &str = "proj";

/// A temp dir holding a Python project at `<tmp>/proj`.
pub struct Fixture {
    pub root: TempDir,
}

impl Fixture {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let root = TempDir::new().unwrap();
        let fixture = Self { root };
        fs::create_dir_all(fixture.project()).unwrap();
        for (path, body) in files {
            fixture.write(path, body);
        }
        fixture
    }

    pub fn project(&self) -> PathBuf {
        self.root.path().join(PROJECT)
    }

    pub fn write(&self, relative: &str, body: &str) {
        let path = self.project().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    pub fn dist(&self) -> PathBuf {
        self.project().join("zipapp_dist")
    }

    pub fn staging(&self) -> PathBuf {
        self.dist().join(PROJECT)
    }

    pub fn archive(&self) -> PathBuf {
        self.dist().join(format!("{PROJECT}.pyz"))
    }

    /// Writes an executable `/bin/sh` script outside the project.
    #[cfg(unix)]
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.root.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

/// A small importable project with an entry function.
pub fn app_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("app/__init__.py", ""),
        ("app/cli.py", "def main():\n    print('hello')\n"),
        ("README.md", "# proj\n"),
        (".git/config", "[core]\n"),
        ("build/leftover.txt", "old build\n"),
    ]
}

/// Sorted `/`-separated paths of everything below `root`.
pub fn tree(root: &Path) -> Vec<String> {
    let mut paths: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| {
            let e = e.unwrap();
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    paths.sort();
    paths
}

/// Sorted entry names of an archive.
pub fn archive_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

pub fn archive_text(path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut text = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    text
}

/// Stands in for `python -m pip install -r <req> --target <dir>`: installs
/// a fake package with metadata and a bytecode cache.
pub const FAKE_PIP_INSTALL: &str = r#"target=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--target" ]; then target="$2"; fi
  shift
done
mkdir -p "$target/fakepkg/__pycache__" "$target/fakepkg-1.0.dist-info"
echo "VALUE = 1" > "$target/fakepkg/__init__.py"
echo "cached" > "$target/fakepkg/__pycache__/__init__.cpython-312.pyc"
echo "Name: fakepkg" > "$target/fakepkg-1.0.dist-info/METADATA"
echo "Collecting fakepkg"
echo "WARNING: fake index in use" >&2
echo "Successfully installed fakepkg-1.0""#;
