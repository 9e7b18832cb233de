// src/discover/matcher.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::BatchConfig;

/// Character a tagged file name must contain next to the tag, as in
/// `abc123_q4.cpp`.
pub const TAG_SEPARATOR: char = '_';

/// Decides whether a file name is a submission source.
///
/// - No tag: the extension must equal the configured source extension.
/// - Tag set: the name must also contain the tag and [`TAG_SEPARATOR`].
#[derive(Debug, Clone)]
pub struct SourceMatcher {
    tag: Option<String>,
    extension: String,
}

impl SourceMatcher {
    pub fn new(tag: Option<String>, extension: impl Into<String>) -> Self {
        Self {
            tag,
            extension: extension.into(),
        }
    }

    pub fn from_config(cfg: &BatchConfig) -> Self {
        Self::new(cfg.question.clone(), cfg.extension.clone())
    }

    pub fn matches(&self, file_name: &str) -> bool {
        let ext_ok = Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext == self.extension.as_str());
        if !ext_ok {
            return false;
        }
        match &self.tag {
            None => true,
            Some(tag) => file_name.contains(tag.as_str()) && file_name.contains(TAG_SEPARATOR),
        }
    }
}

/// Paths the walk never enters or reports.
///
/// The output and archive directories are always skipped, so artifacts of a
/// previous batch are never picked up as submissions. Extra glob patterns are
/// matched against the path relative to the root, with forward slashes.
#[derive(Clone)]
pub struct PathFilter {
    root: PathBuf,
    skip_dirs: Vec<PathBuf>,
    exclude_set: Option<GlobSet>,
}

impl std::fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathFilter")
            .field("root", &self.root)
            .field("skip_dirs", &self.skip_dirs)
            .finish_non_exhaustive()
    }
}

impl PathFilter {
    pub fn from_config(cfg: &BatchConfig) -> Result<Self> {
        let exclude_set = if cfg.exclude.is_empty() {
            None
        } else {
            Some(build_globset(&cfg.exclude).context("building exclude globset")?)
        };

        Ok(Self {
            root: cfg.root.clone(),
            skip_dirs: vec![cfg.output_dir.clone(), cfg.archive_dir.clone()],
            exclude_set,
        })
    }

    pub fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        if is_dir && self.skip_dirs.iter().any(|d| d == path) {
            return true;
        }
        match (&self.exclude_set, path.strip_prefix(&self.root)) {
            (Some(set), Ok(rel)) => {
                let rel_str = rel.to_string_lossy().replace('\\', "/");
                set.is_match(rel_str.as_str())
            }
            _ => false,
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_matcher_only_checks_extension() {
        let m = SourceMatcher::new(None, "cpp");
        assert!(m.matches("main.cpp"));
        assert!(m.matches("abc_q1.cpp"));
        assert!(!m.matches("main.c"));
        assert!(!m.matches("main.cpp.txt"));
        assert!(!m.matches("cpp"));
    }

    #[test]
    fn tagged_matcher_needs_tag_and_separator() {
        let m = SourceMatcher::new(Some("q1".to_string()), "cpp");
        assert!(m.matches("abc123_q1.cpp"));
        assert!(m.matches("q1_final.cpp"));
        assert!(!m.matches("abc123q1.cpp"), "separator is required");
        assert!(!m.matches("abc123_q2.cpp"));
        assert!(!m.matches("abc123_q1.h"));
    }
}
