// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Most flags are optional so that values from `--config` are only overridden
//! when given explicitly. Defaults live in `config::model`.

use clap::{Parser, ValueEnum};

use crate::types::TraversalMode;

/// Command-line arguments for `batchgrade`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "batchgrade",
    version,
    about = "Compile and run every student C/C++ submission under a directory.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory holding the student submissions.
    ///
    /// Required, either here or as `in_dir` in the config file.
    #[arg(long, value_name = "PATH")]
    pub in_dir: Option<String>,

    /// Compiler command (default: `g++`).
    #[arg(long, value_name = "CMD")]
    pub compiler: Option<String>,

    /// Question tag a file name must contain, e.g. `q3`.
    #[arg(short = 'q', long, value_name = "TAG")]
    pub question: Option<String>,

    /// Student identifier to resume the batch from.
    #[arg(long, value_name = "ID")]
    pub student: Option<String>,

    /// Layout of the downloaded submissions (default: `flat`).
    #[arg(long, value_enum, value_name = "MODE")]
    pub source: Option<TraversalMode>,

    /// Times to execute each program (default: 1).
    #[arg(long, value_name = "N")]
    pub times: Option<usize>,

    /// Build the next submission only after the current one finished running.
    #[arg(long)]
    pub strict: bool,

    /// Language standard passed as `-std=<STD>`, e.g. `c++17`.
    #[arg(long, value_name = "STD")]
    pub std: Option<String>,

    /// TOML input script: one `[[run]]` group of lines per repeat, typed into
    /// each run before interactive input. Sets `--times` to the group count.
    #[arg(long, value_name = "PATH")]
    pub inputs: Option<String>,

    /// Optional TOML config file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BATCHGRADE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// List the submissions that would be processed, without building.
    #[arg(long)]
    pub dry_run: bool,

    /// Exit right after the batch instead of waiting for a final Enter.
    #[arg(long)]
    pub no_wait: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
