// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::inputs::load_input_script;
use crate::config::model::{BatchConfig, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; validation happens when the raw
/// value is converted into a [`BatchConfig`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it as-is.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BatchConfig> {
    let raw = load_from_path(path)?;
    finish(raw)
}

/// Build the effective configuration for a run.
///
/// - Starts from `--config` if given, else from built-in defaults.
/// - Applies every CLI flag that was set explicitly.
/// - Validates the result and loads the input script, if any.
pub fn resolve_config(args: &CliArgs) -> Result<BatchConfig> {
    let mut raw = match args.config.as_deref() {
        Some(path) => load_from_path(path)?,
        None => RawConfigFile::default(),
    };
    apply_cli_overrides(&mut raw, args);
    finish(raw)
}

fn finish(raw: RawConfigFile) -> Result<BatchConfig> {
    let inputs = raw.batch.inputs.clone().filter(|p| !p.trim().is_empty());
    let cfg = BatchConfig::try_from(raw)?;
    match inputs {
        Some(path) => {
            debug!(path = %path, "loading input script");
            let script = load_input_script(&path)?;
            cfg.with_input_groups(script.run)
        }
        None => Ok(cfg),
    }
}

/// Overlay explicitly given CLI flags onto a raw config.
pub fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    let batch = &mut raw.batch;

    if let Some(dir) = &args.in_dir {
        batch.in_dir = Some(dir.clone());
    }
    if let Some(compiler) = &args.compiler {
        batch.compiler = compiler.clone();
    }
    if let Some(std) = &args.std {
        batch.std = Some(std.clone());
    }
    if let Some(q) = &args.question {
        batch.question = Some(q.clone());
    }
    if let Some(student) = &args.student {
        batch.student = Some(student.clone());
    }
    if let Some(mode) = args.source {
        batch.source = mode;
    }
    if let Some(times) = args.times {
        batch.times = times;
    }
    if args.strict {
        batch.strict = true;
    }
    if let Some(inputs) = &args.inputs {
        batch.inputs = Some(inputs.clone());
    }
}
