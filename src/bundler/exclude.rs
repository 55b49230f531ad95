//! Glob-style exclusion rules.
//!
//! A pattern matches a path (relative to some root) when it matches the
//! trailing segments of that path, so `*.pyc` matches at any depth and
//! `docs/*.md` matches every `docs` directory's markdown files. A trailing
//! `/` restricts the pattern to directories.
//!
//! Two independent [`ExcludeSet`]s exist in a build: one applied while
//! copying the source tree into staging, one applied while writing the
//! archive.

use crate::bundler::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::{
    collections::BTreeSet,
    path::{Component, Path, PathBuf},
};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A single compiled exclusion pattern.
#[derive(Debug, Clone)]
pub struct ExcludePattern {
    raw: String,
    pattern: Pattern,
    segments: usize,
    dir_only: bool,
}

impl ExcludePattern {
    /// Compiles `raw`. Leading `/` and `./` are ignored.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let dir_only = trimmed.ends_with('/');
        let body = trimmed.trim_start_matches("./").trim_matches('/');

        if body.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: raw.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }

        let pattern = Pattern::new(body).map_err(|e| Error::InvalidPattern {
            pattern: raw.to_string(),
            reason: e.msg.to_string(),
        })?;

        Ok(Self {
            raw: raw.to_string(),
            pattern,
            segments: body.split('/').filter(|s| !s.is_empty()).count(),
            dir_only,
        })
    }

    /// The pattern as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Tests a root-relative path.
    pub fn matches(&self, relative: &Path, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }

        let parts = normal_components(relative);
        if parts.len() < self.segments {
            return false;
        }

        let tail = parts[parts.len() - self.segments..].join("/");
        self.pattern.matches_with(&tail, MATCH_OPTIONS)
    }
}

/// An ordered set of exclusion patterns.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<ExcludePattern>,
}

impl ExcludeSet {
    /// Compiles every non-blank pattern.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter(|p| !p.as_ref().trim().is_empty())
            .map(|p| ExcludePattern::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Returns the set with one more pattern appended.
    pub fn with(mut self, pattern: &str) -> Result<Self> {
        self.patterns.push(ExcludePattern::new(pattern)?);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[ExcludePattern] {
        &self.patterns
    }

    /// True if any pattern matches the path itself.
    pub fn matches(&self, relative: &Path, is_dir: bool) -> bool {
        self.patterns.iter().any(|p| p.matches(relative, is_dir))
    }

    /// Resolves the set against `root`, returning every matched path
    /// relative to `root`. Symlinked directories are descended into.
    pub fn resolve(&self, root: &Path) -> Result<BTreeSet<PathBuf>> {
        let mut matched = BTreeSet::new();
        if self.is_empty() {
            return Ok(matched);
        }

        for entry in walkdir::WalkDir::new(root).min_depth(1).follow_links(true) {
            let entry = entry?;
            let relative = entry.path().strip_prefix(root)?;
            if self.matches(relative, entry.file_type().is_dir()) {
                matched.insert(relative.to_path_buf());
            }
        }

        Ok(matched)
    }
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> ExcludeSet {
        ExcludeSet::new(patterns).unwrap()
    }

    #[test]
    fn single_segment_matches_at_any_depth() {
        let s = set(&["*.pyc", ".git"]);
        assert!(s.matches(Path::new("a.pyc"), false));
        assert!(s.matches(Path::new("pkg/sub/a.pyc"), false));
        assert!(s.matches(Path::new("vendor/.git"), true));
        assert!(!s.matches(Path::new("pkg/a.py"), false));
    }

    #[test]
    fn trailing_slash_only_matches_directories() {
        let s = set(&["build/"]);
        assert!(s.matches(Path::new("build"), true));
        assert!(!s.matches(Path::new("build"), false));
    }

    #[test]
    fn multi_segment_pattern_matches_trailing_components() {
        let s = set(&["docs/*.md"]);
        assert!(s.matches(Path::new("docs/readme.md"), false));
        assert!(s.matches(Path::new("pkg/docs/readme.md"), false));
        assert!(!s.matches(Path::new("readme.md"), false));
        assert!(!s.matches(Path::new("docs/sub/readme.md"), false));
    }

    #[test]
    fn star_does_not_cross_separators_but_matches_dotfiles() {
        let s = set(&["*.egg-info"]);
        assert!(s.matches(Path::new(".hidden.egg-info"), true));
        let s = set(&["a*"]);
        assert!(!s.matches(Path::new("x/b"), false));
    }

    #[test]
    fn blank_patterns_are_skipped_and_bad_ones_rejected() {
        assert!(set(&["", "  "]).is_empty());
        assert!(matches!(
            ExcludeSet::new(["[unclosed"]),
            Err(Error::InvalidPattern { .. })
        ));
        assert!(ExcludePattern::new("/").is_err());
    }

    #[test]
    fn leading_slash_is_ignored() {
        let s = set(&["/zipapp_dist"]);
        assert!(s.matches(Path::new("zipapp_dist"), true));
    }

    #[test]
    fn resolve_lists_matches_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg/__pycache__")).unwrap();
        std::fs::write(dir.path().join("pkg/a.py"), "").unwrap();
        std::fs::write(dir.path().join("pkg/__pycache__/a.pyc"), "").unwrap();

        let found = set(&["__pycache__", "*.pyc"]).resolve(dir.path()).unwrap();
        let found: Vec<_> = found.iter().map(|p| p.to_string_lossy().replace('\\', "/")).collect();
        assert_eq!(found, vec!["pkg/__pycache__", "pkg/__pycache__/a.pyc"]);
    }
}
