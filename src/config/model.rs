// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::config::inputs::InputGroup;
use crate::types::TraversalMode;

/// Configuration as read from an optional TOML file, before validation.
///
/// ```toml
/// [batch]
/// in_dir = "submissions/hw5"
/// compiler = "clang++"
/// std = "c++17"
/// question = "q6"
/// times = 2
/// strict = true
/// source = "student-dirs"
/// inputs = "hw5-inputs.toml"
///
/// [layout]
/// output_dir = "bin"
/// archive_dir = "cpps"
/// exclude = ["**/__MACOSX"]
/// ```
///
/// All sections are optional. CLI flags are applied on top of this value
/// before it is turned into a [`BatchConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub batch: BatchSection,

    #[serde(default)]
    pub layout: LayoutSection,
}

/// `[batch]` section: what to build and how to run it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchSection {
    #[serde(default)]
    pub in_dir: Option<String>,

    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Language standard, passed as `-std=<std>`.
    #[serde(default)]
    pub std: Option<String>,

    /// Source file extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub question: Option<String>,

    #[serde(default)]
    pub student: Option<String>,

    #[serde(default)]
    pub source: TraversalMode,

    #[serde(default = "default_times")]
    pub times: usize,

    #[serde(default)]
    pub strict: bool,

    /// Single character that, typed alone on a line, kills the running
    /// program.
    #[serde(default = "default_kill_char")]
    pub kill_char: String,

    /// Input script with one group of lines per repeat.
    #[serde(default)]
    pub inputs: Option<String>,
}

fn default_compiler() -> String {
    "g++".to_string()
}

fn default_extension() -> String {
    "cpp".to_string()
}

fn default_times() -> usize {
    1
}

fn default_kill_char() -> String {
    "q".to_string()
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            in_dir: None,
            compiler: default_compiler(),
            std: None,
            extension: default_extension(),
            question: None,
            student: None,
            source: TraversalMode::default(),
            times: default_times(),
            strict: false,
            kill_char: default_kill_char(),
            inputs: None,
        }
    }
}

/// `[layout]` section: directories under the root that the batch owns.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSection {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,

    /// Extra glob patterns (relative to the root) that the walk skips.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_output_dir() -> String {
    "bin".to_string()
}

fn default_archive_dir() -> String {
    "cpps".to_string()
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            archive_dir: default_archive_dir(),
            exclude: Vec::new(),
        }
    }
}

/// Validated configuration handed to the discoverer, builder and runner.
///
/// Construct through `BatchConfig::try_from(RawConfigFile)`, which enforces
/// the invariants checked in `validate.rs`. Paths are already joined onto
/// `root`.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub root: PathBuf,
    pub compiler: String,
    pub std: Option<String>,
    pub extension: String,
    pub question: Option<String>,
    pub student: Option<String>,
    pub mode: TraversalMode,
    pub times: usize,
    pub strict: bool,
    pub kill_char: u8,
    pub output_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub exclude: Vec<String>,
    /// Scripted input, indexed by repeat. Empty for fully interactive runs.
    pub input_groups: Vec<InputGroup>,
}

impl BatchConfig {
    /// Resolve a relative root (and the directories under it) against
    /// `base`.
    ///
    /// Compilers and programs run with the root as working directory while
    /// being handed root-prefixed paths, so those paths must not be relative.
    pub fn anchored_at(mut self, base: &std::path::Path) -> Self {
        if self.root.is_relative() {
            self.root = base.join(&self.root);
            self.output_dir = base.join(&self.output_dir);
            self.archive_dir = base.join(&self.archive_dir);
        }
        self
    }

    /// Arguments passed to the compiler after the program name.
    pub fn compile_args(&self, source: &std::path::Path, output: &std::path::Path) -> Vec<String> {
        let mut args = vec![
            source.to_string_lossy().into_owned(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
        ];
        if let Some(std) = &self.std {
            args.push(format!("-std={std}"));
        }
        args
    }
}
