//! Dependency cleaner: strips install metadata and bytecode caches.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    status::StatusSink,
};
use std::path::{Path, PathBuf};

/// Removes `*.dist-info` directories at the top of `staging`, every
/// `__pycache__` directory, and every `*.pyc` file below it.
///
/// Each removal is reported as an info line; the removed paths are
/// returned in the order they were removed. Nothing else is touched.
pub async fn cleanup_dependencies(staging: &Path, status: &dyn StatusSink) -> Result<Vec<PathBuf>> {
    status.info("Cleaning up dependencies...");

    let root = staging.to_path_buf();
    let removed = tokio::task::spawn_blocking(move || remove_artifacts(&root))
        .await
        .map_err(|e| Error::GenericError(format!("Cleanup task panicked: {}", e)))??;

    for path in &removed {
        status.info(&format!("Removing {}", path.to_string_lossy().replace('\\', "/")));
    }
    status.success("Dependency cleanup completed");
    log::debug!("Removed {} artifacts from {}", removed.len(), staging.display());

    Ok(removed)
}

fn remove_artifacts(root: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    let mut dist_infos = Vec::new();
    for entry in std::fs::read_dir(root).fs_context("reading directory", root)? {
        let entry = entry.fs_context("reading directory", root)?;
        let path = entry.path();
        if path.is_dir() && entry.file_name().to_string_lossy().ends_with(".dist-info") {
            dist_infos.push(path);
        }
    }
    dist_infos.sort();
    for dir in dist_infos {
        std::fs::remove_dir_all(&dir).fs_context("removing directory", &dir)?;
        removed.push(dir);
    }

    // Collected before deleting so the walk never sees a vanished directory.
    let caches = walk_matching(root, |entry| {
        entry.file_type().is_dir() && entry.file_name() == "__pycache__"
    })?;
    for dir in caches {
        std::fs::remove_dir_all(&dir).fs_context("removing directory", &dir)?;
        removed.push(dir);
    }

    let bytecode = walk_matching(root, |entry| {
        entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(".pyc")
    })?;
    for file in bytecode {
        std::fs::remove_file(&file).fs_context("removing file", &file)?;
        removed.push(file);
    }

    Ok(removed)
}

/// Paths below `root` selected by `keep`; matched directories are not descended.
fn walk_matching<F>(root: &Path, keep: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&walkdir::DirEntry) -> bool,
{
    let mut found = Vec::new();
    let mut walker = walkdir::WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        if keep(&entry) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            found.push(entry.into_path());
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::status::{RecordingSink, StatusLevel};
    use std::fs;

    #[tokio::test]
    async fn removes_metadata_caches_and_bytecode_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("requests-2.0.dist-info")).unwrap();
        fs::create_dir_all(root.join("requests/__pycache__")).unwrap();
        fs::create_dir_all(root.join("nested/pkg.dist-info")).unwrap();
        fs::write(root.join("requests/__init__.py"), "").unwrap();
        fs::write(root.join("requests/__pycache__/x.cpython-312.pyc"), "").unwrap();
        fs::write(root.join("requests/stale.pyc"), "").unwrap();
        fs::write(root.join("keep.dist-info"), "file, not a directory").unwrap();

        let sink = RecordingSink::new();
        let removed = cleanup_dependencies(root, &sink).await.unwrap();

        assert_eq!(removed.len(), 3);
        assert!(!root.join("requests-2.0.dist-info").exists());
        assert!(!root.join("requests/__pycache__").exists());
        assert!(!root.join("requests/stale.pyc").exists());
        assert!(root.join("requests/__init__.py").exists());
        assert!(root.join("nested/pkg.dist-info").exists());
        assert!(root.join("keep.dist-info").exists());

        let info = sink.messages(StatusLevel::Info);
        assert_eq!(info[0], "Cleaning up dependencies...");
        assert!(info[1..].iter().all(|m| m.starts_with("Removing ")));
        assert_eq!(sink.messages(StatusLevel::Success).len(), 1);
    }

    #[tokio::test]
    async fn clean_tree_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "").unwrap();

        let removed = cleanup_dependencies(dir.path(), &RecordingSink::new())
            .await
            .unwrap();
        assert!(removed.is_empty());
        assert!(dir.path().join("main.py").exists());
    }
}
