//! File system utilities for staging.
//!
//! Provides idempotent directory creation and removal plus a filtered
//! recursive copy that preserves symlinks.

use crate::{
    bail,
    bundler::error::{Error, ErrorExt, Result},
};
use std::{
    io::{self},
    path::Path,
};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(Error::Fs {
            context: "removing directory",
            path: path.to_path_buf(),
            error: e,
        }),
    }
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Recursively copies a directory, skipping every entry for which
/// `exclude(relative_path, is_dir)` returns true.
///
/// Excluded directories are never descended into. Symlinks are recreated
/// rather than followed. The destination directory must already exist.
/// Returns the number of files and links copied.
pub async fn copy_dir_filtered<F>(from: &Path, to: &Path, exclude: F) -> Result<usize>
where
    F: Fn(&Path, bool) -> bool + Send + 'static,
{
    if !from.is_dir() {
        bail!("{} is not a directory", from.display());
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    // Offload blocking work to dedicated thread pool
    tokio::task::spawn_blocking(move || {
        let mut copied = 0;
        let walker = walkdir::WalkDir::new(&from)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| match entry.path().strip_prefix(&from) {
                Ok(rel) => !exclude(rel, entry.file_type().is_dir()),
                Err(_) => false,
            });

        for entry in walker {
            let entry = entry?;
            let rel_path = entry.path().strip_prefix(&from)?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path())
                    .fs_context("reading symlink", entry.path())?;
                let result = if entry.path().is_dir() {
                    symlink_dir(&target, &dest_path)
                } else {
                    symlink_file(&target, &dest_path)
                };
                result.fs_context("creating symlink", &dest_path)?;
                copied += 1;
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
            } else {
                std::fs::copy(entry.path(), &dest_path).fs_context("copying file", entry.path())?;
                copied += 1;
            }
        }

        Ok(copied)
    })
    .await
    .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {}", e)))?
}
