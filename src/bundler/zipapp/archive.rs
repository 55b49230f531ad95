//! Archive assembler.
//!
//! Produces a runnable zip application: an optional `#!` interpreter line
//! followed by a zip of the staged tree. The archive is built in a
//! temporary file next to the target and renamed into place, so a failed
//! build never leaves a truncated archive behind.

use super::EntryPoint;
use crate::bundler::{
    error::{Error, ErrorExt, Result},
    exclude::ExcludeSet,
    settings::MAIN_FILE,
};
use std::{
    collections::BTreeSet,
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Everything needed to write one archive.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Staged tree to package.
    pub source: PathBuf,
    /// Final archive path.
    pub target: PathBuf,
    /// Interpreter line, with or without the leading `#!`. Empty for none.
    pub interpreter: String,
    /// Entry point to generate `__main__.py` for.
    pub entry: Option<EntryPoint>,
    pub compressed: bool,
    /// Paths matched here, and everything below matched directories, are left out.
    pub excludes: ExcludeSet,
}

/// The line written at the start of the archive, if any.
pub fn shebang_line(interpreter: &str) -> Option<String> {
    let interpreter = interpreter.trim();
    let interpreter = interpreter.strip_prefix("#!").unwrap_or(interpreter).trim();
    if interpreter.is_empty() {
        None
    } else {
        Some(format!("#!{interpreter}\n"))
    }
}

/// Writes the archive described by `options`. Returns the number of zip
/// entries written.
pub async fn create_archive(options: ArchiveOptions) -> Result<usize> {
    tokio::task::spawn_blocking(move || write_archive(&options))
        .await
        .map_err(|e| Error::GenericError(format!("Archive task panicked: {}", e)))?
}

fn write_archive(options: &ArchiveOptions) -> Result<usize> {
    let has_main = options.source.join(MAIN_FILE).is_file();
    match (&options.entry, has_main) {
        (Some(_), true) => {
            return Err(Error::Archive(format!(
                "cannot specify an entry point when the source has a {MAIN_FILE} file"
            )));
        }
        (None, false) => {
            return Err(Error::Archive(format!(
                "archive has no entry point and the source has no {MAIN_FILE} file"
            )));
        }
        _ => {}
    }

    let parent = options
        .target
        .parent()
        .ok_or_else(|| Error::Archive(format!("invalid target path {}", options.target.display())))?;
    std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;

    let excluded = options.excludes.resolve(&options.source)?;
    log::debug!(
        "Writing {} ({} paths excluded from packaging)",
        options.target.display(),
        excluded.len()
    );

    let mut temp = tempfile::Builder::new()
        .prefix(".zipapp-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .fs_context("creating temporary archive", parent)?;
    let temp_path = temp.path().to_path_buf();

    let shebang = shebang_line(&options.interpreter);
    if let Some(line) = &shebang {
        temp.as_file_mut()
            .write_all(line.as_bytes())
            .fs_context("writing interpreter line", &temp_path)?;
    }

    let method = if options.compressed {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    };
    let skip = [temp_path.as_path(), options.target.as_path()];
    let written = write_entries(temp.as_file_mut(), options, &excluded, &skip, method)?;

    set_archive_mode(temp.as_file(), &temp_path, shebang.is_some())?;
    temp.persist(&options.target).map_err(|e| Error::Fs {
        context: "replacing archive",
        path: options.target.clone(),
        error: e.error,
    })?;

    log::info!("Wrote {} entries to {}", written, options.target.display());
    Ok(written)
}

fn write_entries(
    file: &mut File,
    options: &ArchiveOptions,
    excluded: &BTreeSet<PathBuf>,
    skip: &[&Path],
    method: CompressionMethod,
) -> Result<usize> {
    let base = SimpleFileOptions::default().compression_method(method);
    let mut zip = ZipWriter::new(file);
    let mut written = 0;

    let walker = walkdir::WalkDir::new(&options.source)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if skip.contains(&entry.path()) {
                return false;
            }
            match entry.path().strip_prefix(&options.source) {
                Ok(rel) => !excluded.contains(rel),
                Err(_) => false,
            }
        });

    for entry in walker {
        let entry = entry?;
        let rel = entry.path().strip_prefix(&options.source)?;
        let name = archive_name(rel);
        let entry_options = base.unix_permissions(unix_mode(entry.path()));

        if entry.file_type().is_dir() {
            zip.add_directory(name, entry_options)?;
        } else {
            zip.start_file(name, entry_options)?;
            let mut input = File::open(entry.path()).fs_context("opening file", entry.path())?;
            io::copy(&mut input, &mut zip).fs_context("archiving file", entry.path())?;
        }
        written += 1;
    }

    if let Some(entry) = &options.entry {
        zip.start_file(MAIN_FILE, base.unix_permissions(0o644))?;
        zip.write_all(entry.main_module_source().as_bytes())?;
        written += 1;
    }

    zip.finish()?;
    Ok(written)
}

/// Forward-slash archive name for a relative path.
fn archive_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn unix_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn unix_mode(path: &Path) -> u32 {
    if path.is_dir() { 0o755 } else { 0o644 }
}

/// Readable by everyone, and executable when an interpreter line was written.
#[cfg(unix)]
fn set_archive_mode(file: &File, path: &Path, executable: bool) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = if executable { 0o755 } else { 0o644 };
    file.set_permissions(std::fs::Permissions::from_mode(mode))
        .fs_context("setting permissions", path)
}

#[cfg(not(unix))]
fn set_archive_mode(_file: &File, _path: &Path, _executable: bool) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn shebang_is_normalized() {
        assert_eq!(
            shebang_line("/usr/bin/env python3").as_deref(),
            Some("#!/usr/bin/env python3\n")
        );
        assert_eq!(
            shebang_line("#!/usr/bin/env python3").as_deref(),
            Some("#!/usr/bin/env python3\n")
        );
        assert_eq!(shebang_line("  "), None);
        assert_eq!(shebang_line("#!"), None);
    }

    fn staged(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, body) in files {
            let path = dir.path().join("stage").join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }
        dir
    }

    fn options(dir: &Path, entry: Option<&str>) -> ArchiveOptions {
        ArchiveOptions {
            source: dir.join("stage"),
            target: dir.join("out/app.pyz"),
            interpreter: "/usr/bin/env python3".into(),
            entry: entry.and_then(EntryPoint::parse),
            compressed: true,
            excludes: ExcludeSet::new(["docs/", "*.md"]).unwrap(),
        }
    }

    #[tokio::test]
    async fn writes_sorted_entries_and_generated_main() {
        let dir = staged(&[
            ("pkg/cli.py", "def main(): pass\n"),
            ("pkg/__init__.py", ""),
            ("README.md", "readme"),
            ("docs/index.txt", "excluded with its directory"),
        ]);

        create_archive(options(dir.path(), Some("pkg.cli:main")))
            .await
            .unwrap();

        let bytes = std::fs::read(dir.path().join("out/app.pyz")).unwrap();
        assert!(bytes.starts_with(b"#!/usr/bin/env python3\n"));

        let mut archive = zip::ZipArchive::new(io::Cursor::new(bytes)).unwrap();
        let names: Vec<_> = archive.file_names().map(str::to_string).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, ["__main__.py", "pkg/", "pkg/__init__.py", "pkg/cli.py"]);

        let mut main = String::new();
        archive
            .by_name("__main__.py")
            .unwrap()
            .read_to_string(&mut main)
            .unwrap();
        assert_eq!(main, "# -*- coding: utf-8 -*-\nimport pkg.cli\npkg.cli.main()\n");
    }

    #[tokio::test]
    async fn entry_conflicts_with_existing_main() {
        let dir = staged(&[("__main__.py", "print('hi')\n")]);
        let err = create_archive(options(dir.path(), Some("app:main")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
        assert!(!dir.path().join("out/app.pyz").exists());
    }

    #[tokio::test]
    async fn missing_entry_and_main_is_rejected() {
        let dir = staged(&[("app.py", "")]);
        let err = create_archive(options(dir.path(), None)).await.unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn archive_with_shebang_is_executable() {
        let dir = staged(&[("__main__.py", "")]);
        create_archive(options(dir.path(), None)).await.unwrap();
        assert_eq!(mode_of(&dir.path().join("out/app.pyz")), 0o755);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn archive_without_shebang_is_world_readable() {
        let dir = staged(&[("__main__.py", "")]);
        let mut opts = options(dir.path(), None);
        opts.interpreter = String::new();
        create_archive(opts).await.unwrap();
        assert_eq!(mode_of(&dir.path().join("out/app.pyz")), 0o644);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_directories_are_archived_through_the_link() {
        let dir = staged(&[("__main__.py", ""), ("shared/util.py", "X = 1
")]);
        let stage = dir.path().join("stage");
        std::os::unix::fs::symlink("shared", stage.join("linked")).unwrap();
        std::os::unix::fs::symlink("shared/util.py", stage.join("alias.py")).unwrap();

        create_archive(options(dir.path(), None)).await.unwrap();

        let file = File::open(dir.path().join("out/app.pyz")).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            [
                "__main__.py",
                "alias.py",
                "linked/",
                "linked/util.py",
                "shared/",
                "shared/util.py",
            ]
        );

        let mut body = String::new();
        archive
            .by_name("linked/util.py")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "X = 1\n");
    }

    #[tokio::test]
    async fn target_inside_the_staged_tree_is_not_archived_into_itself() {
        let dir = staged(&[("__main__.py", ""), ("big.bin", "x".repeat(64 * 1024).as_str())]);
        let mut opts = options(dir.path(), None);
        opts.target = dir.path().join("stage/out.pyz");
        opts.compressed = false;

        let written = tokio::time::timeout(std::time::Duration::from_secs(10), create_archive(opts))
            .await
            .expect("archive did not finish")
            .unwrap();
        assert_eq!(written, 2);

        let file = File::open(dir.path().join("stage/out.pyz")).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, ["__main__.py", "big.bin"]);
    }
}
