use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;

/// How the starting identifier (`--student`) interacts with the walk.
///
/// - `Flat`: every visited entry name is compared while the identifier is
///   still pending; the first entry containing it resumes normal matching.
///   This suits exports where submissions sit in loosely named folders or
///   directly in the root (default behaviour).
/// - `StudentDirs`: the identifier is resolved against the root's immediate
///   subdirectories before the walk starts. Everything at the top level that
///   sorts before the matched directory is skipped without descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalMode {
    #[default]
    #[serde(alias = "gradescope")]
    #[value(alias = "gradescope")]
    Flat,
    #[serde(alias = "nyuclasses")]
    #[value(alias = "nyuclasses")]
    StudentDirs,
}

/// One discovered submission source file.
///
/// `build_path` is filled in exactly once, by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// File name of the source, e.g. `abc123_q1_main.cpp`.
    pub name: String,
    pub source: PathBuf,
    pub build_path: Option<PathBuf>,
}

impl Unit {
    pub fn new(source: PathBuf) -> Self {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            source,
            build_path: None,
        }
    }

    /// Binary name: the file name without its extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or(&self.name)
    }
}

/// Result of a single compile or run step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    /// Non-zero exit, or `-1` when the process could not be spawned or
    /// waited on.
    Failed(i32),
    /// Terminated by the operator through the kill line.
    Killed,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success)
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Success => write!(f, "ok"),
            StepOutcome::Failed(code) => write!(f, "exit code {code}"),
            StepOutcome::Killed => write!(f, "killed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_name_and_stem_come_from_the_file_name() {
        let unit = Unit::new(PathBuf::from("root/abc123/abc123_q1_main.cpp"));
        assert_eq!(unit.name, "abc123_q1_main.cpp");
        assert_eq!(unit.stem(), "abc123_q1_main");
        assert!(unit.build_path.is_none());
    }
}
