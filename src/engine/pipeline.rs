// src/engine/pipeline.rs

//! Build/run pipeline.
//!
//! The producer task walks the tree and builds each unit; the consumer loop
//! (on the caller's task) runs them. They share only a depth-one channel and,
//! in strict mode, a single-permit semaphore:
//!
//! ```text
//!  Discovery ──▶ Builder ──[mpsc(1)]──▶ Runner
//!                   ▲                      │
//!                   └──── permit (strict) ─┘
//! ```
//!
//! The producer reserves the channel slot *before* compiling, so at most one
//! built unit ever waits while another is running, and a unit is only sent
//! after its compiler has exited.

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

use crate::config::BatchConfig;
use crate::discover::Discovery;
use crate::engine::report::BatchReport;
use crate::errors::Result;
use crate::exec::{Builder, BuiltUnit, ProcessBackend, Runner, TerminalInput};
use crate::fs::FileSystem;

pub struct Pipeline<B: ProcessBackend + 'static> {
    config: Arc<BatchConfig>,
    fs: Arc<dyn FileSystem>,
    backend: Arc<B>,
}

impl<B: ProcessBackend + 'static> Pipeline<B> {
    pub fn new(config: Arc<BatchConfig>, fs: Arc<dyn FileSystem>, backend: Arc<B>) -> Self {
        Self {
            config,
            fs,
            backend,
        }
    }

    /// Run the whole batch.
    ///
    /// Returns once every discovered unit has been built and run, or with the
    /// first fatal error (traversal failure, missing starting identifier).
    /// Per-unit failures only show up in the report.
    pub async fn run(self, input: &mut TerminalInput) -> Result<BatchReport> {
        let discovery = Discovery::new(Arc::clone(&self.fs), &self.config)?;

        let token = self.config.strict.then(|| Arc::new(Semaphore::new(1)));
        let builder = Builder::new(
            Arc::clone(&self.config),
            Arc::clone(&self.fs),
            Arc::clone(&self.backend),
            token,
        );
        let runner = Runner::new(Arc::clone(&self.config), Arc::clone(&self.backend));

        let (tx, mut rx) = mpsc::channel::<BuiltUnit>(1);
        let producer = tokio::spawn(produce(discovery, builder, tx));

        info!(root = ?self.config.root, strict = self.config.strict, "batch started");

        let mut report = BatchReport::new();
        while let Some(built) = rx.recv().await {
            let BuiltUnit {
                unit,
                outcome,
                permit,
            } = built;

            let runs = if outcome.is_success() {
                runner.run_unit(&unit, input).await
            } else {
                warn!(unit = %unit.name, "not running: build failed");
                Vec::new()
            };

            // Strict mode: the next build may start only now.
            drop(permit);
            report.record(unit, outcome, runs);
        }

        producer
            .await
            .map_err(|e| anyhow!("build task panicked: {e}"))??;

        println!("\nDONE");
        Ok(report)
    }
}

/// Producer side: discover, build, hand off.
///
/// Archive copies already scheduled are awaited on every exit path, fatal
/// traversal errors included.
async fn produce<B: ProcessBackend>(
    discovery: Discovery,
    mut builder: Builder<B>,
    tx: mpsc::Sender<BuiltUnit>,
) -> Result<()> {
    let result = build_all(discovery, &mut builder, &tx).await;
    drop(tx);

    builder.finish_archives().await;
    match &result {
        Ok(()) => debug!("discovery finished"),
        Err(e) => warn!(error = %e, "discovery aborted"),
    }
    result
}

async fn build_all<B: ProcessBackend>(
    discovery: Discovery,
    builder: &mut Builder<B>,
    tx: &mpsc::Sender<BuiltUnit>,
) -> Result<()> {
    for unit in discovery {
        let unit = unit?;

        let Ok(slot) = tx.reserve().await else {
            debug!("runner stopped; ending discovery");
            break;
        };

        let built = builder.build(unit).await?;
        slot.send(built);
    }
    Ok(())
}
