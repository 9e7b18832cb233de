// src/lib.rs

pub mod cli;
pub mod config;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod layout;
pub mod logging;
pub mod types;

use std::sync::Arc;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{BatchConfig, resolve_config};
use crate::discover::Discovery;
use crate::engine::Pipeline;
use crate::errors::Result;
use crate::exec::{RealProcessBackend, TerminalInput};
use crate::fs::{FileSystem, RealFileSystem};
use crate::layout::prepare_layout;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (file + CLI flags)
/// - output/archive directory preparation
/// - the build/run pipeline over real processes
/// - the final "press Enter" gate
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?.anchored_at(&std::env::current_dir()?);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    if args.dry_run {
        return print_dry_run(fs, &cfg);
    }

    prepare_layout(fs.as_ref(), &cfg)?;

    // One reader for the whole batch, shared by every program and the gate.
    let mut input = TerminalInput::stdin();

    let pipeline = Pipeline::new(Arc::new(cfg), fs, Arc::new(RealProcessBackend::new()));
    let report = pipeline.run(&mut input).await?;
    report.log_summary();

    if !args.no_wait {
        input.wait_for_newline().await;
    }

    Ok(())
}

/// Dry-run output: the effective settings and every unit that would be built.
fn print_dry_run(fs: Arc<dyn FileSystem>, cfg: &BatchConfig) -> Result<()> {
    println!("batchgrade dry-run");
    println!("  root     = {}", cfg.root.display());
    println!("  compiler = {}", cfg.compiler);
    if let Some(ref std) = cfg.std {
        println!("  std      = {std}");
    }
    if let Some(ref q) = cfg.question {
        println!("  question = {q}");
    }
    if let Some(ref student) = cfg.student {
        println!("  student  = {student} ({:?})", cfg.mode);
    }
    println!("  times    = {}", cfg.times);
    println!("  strict   = {}", cfg.strict);
    if !cfg.input_groups.is_empty() {
        println!("  inputs   = {} scripted run(s)", cfg.input_groups.len());
    }
    println!();

    let mut count = 0usize;
    for unit in Discovery::new(fs, cfg)? {
        let unit = unit?;
        count += 1;
        println!("  - {}", unit.name);
        println!("      source: {}", unit.source.display());
        println!("      binary: {}", cfg.output_dir.join(unit.stem()).display());
    }
    println!();
    println!("{count} submission(s) found");

    debug!("dry-run complete (no execution)");
    Ok(())
}
