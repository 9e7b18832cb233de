// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The builder and runner describe *what* to launch ([`CompileRequest`],
//! [`RunRequest`]) and a `ProcessBackend` decides *how*. Production uses
//! [`RealProcessBackend`] (`tokio::process`); tests swap in a recording fake
//! so pipeline ordering can be checked without a compiler.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{BatchError, Result};
use crate::exec::input::{TerminalInput, forward_until_exit};
use crate::types::StepOutcome;

/// One compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub unit: String,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// One execution of a built program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub unit: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub kill_char: u8,
    /// 1-based repeat index, for logging.
    pub attempt: usize,
    /// Scripted input written to stdin before interactive forwarding.
    pub preset: Vec<u8>,
}

pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<StepOutcome>> + Send + 'a>>;

/// Trait abstracting how compilers and student programs are launched.
///
/// An `Err` means the process could not be started or waited on; callers
/// treat it as a per-unit failure, never as fatal.
pub trait ProcessBackend: Send + Sync {
    /// Run the compiler to completion.
    fn compile<'a>(&'a self, request: &'a CompileRequest) -> BackendFuture<'a>;

    /// Run a built program to completion, feeding it operator input.
    fn execute<'a>(
        &'a self,
        request: &'a RunRequest,
        input: &'a mut TerminalInput,
    ) -> BackendFuture<'a>;
}

/// Backend that spawns real OS processes sharing this terminal.
#[derive(Debug, Clone, Default)]
pub struct RealProcessBackend;

impl RealProcessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for RealProcessBackend {
    fn compile<'a>(&'a self, request: &'a CompileRequest) -> BackendFuture<'a> {
        Box::pin(async move {
            debug!(unit = %request.unit, program = %request.program, args = ?request.args, "invoking compiler");

            let status = Command::new(&request.program)
                .args(&request.args)
                .current_dir(&request.cwd)
                .stdin(Stdio::null())
                .status()
                .await
                .map_err(|source| BatchError::Spawn {
                    program: request.program.clone(),
                    source,
                })?;

            Ok(match status.code() {
                Some(0) => StepOutcome::Success,
                Some(code) => StepOutcome::Failed(code),
                None => StepOutcome::Failed(-1),
            })
        })
    }

    fn execute<'a>(
        &'a self,
        request: &'a RunRequest,
        input: &'a mut TerminalInput,
    ) -> BackendFuture<'a> {
        Box::pin(async move {
            let mut child = Command::new(&request.program)
                .args(&request.args)
                .current_dir(&request.cwd)
                .stdin(Stdio::piped())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .kill_on_drop(true)
                .spawn()
                .map_err(|source| BatchError::Spawn {
                    program: request.program.display().to_string(),
                    source,
                })?;

            info!(unit = %request.unit, attempt = request.attempt, pid = ?child.id(), "program started");

            let exit = forward_until_exit(&mut child, input, request.kill_char, &request.preset).await?;

            Ok(if exit.killed {
                StepOutcome::Killed
            } else {
                match exit.status.code() {
                    Some(0) => StepOutcome::Success,
                    Some(code) => StepOutcome::Failed(code),
                    None => StepOutcome::Failed(-1),
                }
            })
        })
    }
}
