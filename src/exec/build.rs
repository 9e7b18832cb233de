// src/exec/build.rs

//! Compiling one unit and queueing its archive copy.

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::BatchConfig;
use crate::errors::Result;
use crate::exec::archive::spawn_archive;
use crate::exec::backend::{CompileRequest, ProcessBackend};
use crate::fs::FileSystem;
use crate::types::{StepOutcome, Unit};

/// A unit whose compiler invocation has completed (successfully or not).
///
/// In strict mode it carries the sequencing permit; dropping the permit lets
/// the next build start.
#[derive(Debug)]
pub struct BuiltUnit {
    pub unit: Unit,
    pub outcome: StepOutcome,
    pub permit: Option<OwnedSemaphorePermit>,
}

/// Compiles units one at a time on the producer side of the pipeline.
pub struct Builder<B: ProcessBackend> {
    config: Arc<BatchConfig>,
    fs: Arc<dyn FileSystem>,
    backend: Arc<B>,
    token: Option<Arc<Semaphore>>,
    archives: Vec<JoinHandle<()>>,
}

impl<B: ProcessBackend> std::fmt::Debug for Builder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("compiler", &self.config.compiler)
            .field("strict", &self.token.is_some())
            .field("pending_archives", &self.archives.len())
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Builder<B> {
    /// `token` is the sequencing semaphore for strict mode, `None` otherwise.
    pub fn new(
        config: Arc<BatchConfig>,
        fs: Arc<dyn FileSystem>,
        backend: Arc<B>,
        token: Option<Arc<Semaphore>>,
    ) -> Self {
        Self {
            config,
            fs,
            backend,
            token,
            archives: Vec::new(),
        }
    }

    /// Compiler invocation for `unit`: `<compiler> <source> -o <bin>/<stem>`.
    pub fn compile_request(&self, unit: &Unit) -> CompileRequest {
        let output = self.config.output_dir.join(unit.stem());
        CompileRequest {
            unit: unit.name.clone(),
            program: self.config.compiler.clone(),
            args: self.config.compile_args(&unit.source, &output),
            cwd: self.config.root.clone(),
        }
    }

    /// Compile `unit` and schedule the archive copy.
    ///
    /// Compiler failures are recorded in the returned outcome. The only error
    /// is a closed sequencing semaphore.
    pub async fn build(&mut self, mut unit: Unit) -> Result<BuiltUnit> {
        let permit = match &self.token {
            Some(token) => {
                debug!(unit = %unit.name, "waiting for sequencing token");
                let permit = Arc::clone(token)
                    .acquire_owned()
                    .await
                    .map_err(|e| anyhow!("sequencing token closed: {e}"))?;
                Some(permit)
            }
            None => None,
        };

        let request = self.compile_request(&unit);
        unit.build_path = Some(self.config.output_dir.join(unit.stem()));

        info!(unit = %unit.name, "building");
        let outcome = match self.backend.compile(&request).await {
            Ok(StepOutcome::Success) => StepOutcome::Success,
            Ok(outcome) => {
                warn!(unit = %unit.name, %outcome, "build failed");
                outcome
            }
            Err(err) => {
                error!(unit = %unit.name, error = %err, "compiler could not be run");
                StepOutcome::Failed(-1)
            }
        };

        let dest = self.config.archive_dir.join(&unit.name);
        self.archives
            .push(spawn_archive(Arc::clone(&self.fs), unit.source.clone(), dest));

        Ok(BuiltUnit {
            unit,
            outcome,
            permit,
        })
    }

    /// Wait for the archive copies scheduled so far.
    pub async fn finish_archives(&mut self) {
        for handle in self.archives.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "archive task did not complete");
            }
        }
    }
}
