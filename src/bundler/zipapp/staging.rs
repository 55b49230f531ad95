//! Stager: filtered copy of the source tree into a fresh staging directory.

use crate::bundler::{error::Result, exclude::ExcludeSet, utils::fs};
use std::path::Path;

/// Copies `source` into `staging`, skipping everything matched by `excludes`.
///
/// `staging` is destroyed first if it exists, so each build starts clean.
/// Patterns are evaluated against paths relative to `source` during the
/// walk; matched directories are not traversed. Returns the number of
/// files copied.
pub async fn stage_source_tree(source: &Path, staging: &Path, excludes: &ExcludeSet) -> Result<usize> {
    log::debug!(
        "Staging {} -> {} ({} exclusion patterns)",
        source.display(),
        staging.display(),
        excludes.patterns().len()
    );

    fs::create_dir_all(staging, true).await?;

    let excludes = excludes.clone();
    let copied = fs::copy_dir_filtered(source, staging, move |rel, is_dir| {
        let skip = excludes.matches(rel, is_dir);
        if skip {
            log::debug!("Not copying {}", rel.display());
        }
        skip
    })
    .await?;

    log::info!("Staged {} files into {}", copied, staging.display());
    Ok(copied)
}
