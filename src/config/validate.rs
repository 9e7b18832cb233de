// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use globset::Glob;

use crate::config::inputs::InputGroup;
use crate::config::model::{BatchConfig, LayoutSection, RawConfigFile};
use crate::errors::{BatchError, Result};

impl TryFrom<RawConfigFile> for BatchConfig {
    type Error = BatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let root = validate_root(raw.batch.in_dir.as_deref())?;
        validate_batch(&raw)?;
        validate_layout(&raw.layout)?;

        let kill_char = raw.batch.kill_char.as_bytes()[0];
        let extension = raw.batch.extension.trim_start_matches('.').to_string();

        Ok(BatchConfig {
            output_dir: root.join(&raw.layout.output_dir),
            archive_dir: root.join(&raw.layout.archive_dir),
            root,
            compiler: raw.batch.compiler,
            std: non_empty(raw.batch.std),
            extension,
            question: non_empty(raw.batch.question),
            student: non_empty(raw.batch.student),
            mode: raw.batch.source,
            times: raw.batch.times,
            strict: raw.batch.strict,
            kill_char,
            exclude: raw.layout.exclude,
            input_groups: Vec::new(),
        })
    }
}

impl BatchConfig {
    /// Attach scripted input, one group per repeat.
    ///
    /// The repeat count follows the number of groups. A repeat count other
    /// than the default 1 must agree with it.
    pub fn with_input_groups(mut self, groups: Vec<InputGroup>) -> Result<Self> {
        if groups.is_empty() {
            return Err(BatchError::ConfigError(
                "input script must contain at least one [[run]] group".to_string(),
            ));
        }
        if self.times != 1 && self.times != groups.len() {
            return Err(BatchError::ConfigError(format!(
                "[batch].times is {} but the input script has {} groups",
                self.times,
                groups.len()
            )));
        }
        self.times = groups.len();
        self.input_groups = groups;
        Ok(self)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn validate_root(in_dir: Option<&str>) -> Result<PathBuf> {
    match in_dir {
        Some(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir)),
        _ => Err(BatchError::ConfigError(
            "input directory must be set (--in-dir or [batch].in_dir)".to_string(),
        )),
    }
}

fn validate_batch(cfg: &RawConfigFile) -> Result<()> {
    let batch = &cfg.batch;

    if batch.compiler.trim().is_empty() {
        return Err(BatchError::ConfigError(
            "[batch].compiler must not be empty".to_string(),
        ));
    }

    if batch.times == 0 {
        return Err(BatchError::ConfigError(
            "[batch].times must be >= 1 (got 0)".to_string(),
        ));
    }

    if batch.extension.trim_start_matches('.').is_empty() {
        return Err(BatchError::ConfigError(
            "[batch].extension must not be empty".to_string(),
        ));
    }

    let kill = batch.kill_char.as_bytes();
    if kill.len() != 1 || !kill[0].is_ascii_graphic() {
        return Err(BatchError::ConfigError(format!(
            "[batch].kill_char must be a single visible ASCII character (got {:?})",
            batch.kill_char
        )));
    }

    Ok(())
}

fn validate_layout(layout: &LayoutSection) -> Result<()> {
    for (key, dir) in [
        ("output_dir", &layout.output_dir),
        ("archive_dir", &layout.archive_dir),
    ] {
        if !is_single_component(dir) {
            return Err(BatchError::ConfigError(format!(
                "[layout].{key} must be a plain directory name inside the root (got {dir:?})"
            )));
        }
    }

    if layout.output_dir == layout.archive_dir {
        return Err(BatchError::ConfigError(format!(
            "[layout].output_dir and archive_dir must differ (both {:?})",
            layout.output_dir
        )));
    }

    for pat in layout.exclude.iter() {
        Glob::new(pat).map_err(|e| {
            BatchError::ConfigError(format!("invalid exclude pattern {pat:?}: {e}"))
        })?;
    }

    Ok(())
}

fn is_single_component(dir: &str) -> bool {
    let mut components = Path::new(dir).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
