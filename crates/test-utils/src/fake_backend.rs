use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;

use batchgrade::exec::backend::{BackendFuture, CompileRequest, ProcessBackend, RunRequest};
use batchgrade::exec::TerminalInput;
use batchgrade::types::StepOutcome;

/// Something the fake backend was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    CompileStarted(String),
    CompileFinished(String),
    RunStarted(String, usize),
    RunFinished(String, usize),
}

/// A fake backend that:
/// - records compile/run start and finish events in order
/// - sleeps for a configurable time inside each step, so overlapping steps
///   would show up as interleaved events
/// - fails the compile of selected units
/// - refuses to start the programs of selected units, like a missing binary
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    events: Arc<Mutex<Vec<BackendEvent>>>,
    failing_builds: HashSet<String>,
    unstartable: HashSet<String>,
    compile_delay: Duration,
    run_delay: Duration,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_build(mut self, unit: &str) -> Self {
        self.failing_builds.insert(unit.to_string());
        self
    }

    pub fn fail_spawn(mut self, unit: &str) -> Self {
        self.unstartable.insert(unit.to_string());
        self
    }

    pub fn compile_delay(mut self, delay: Duration) -> Self {
        self.compile_delay = delay;
        self
    }

    pub fn run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = delay;
        self
    }

    pub fn events(&self) -> Vec<BackendEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: BackendEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProcessBackend for RecordingBackend {
    fn compile<'a>(&'a self, request: &'a CompileRequest) -> BackendFuture<'a> {
        Box::pin(async move {
            self.push(BackendEvent::CompileStarted(request.unit.clone()));
            tokio::time::sleep(self.compile_delay).await;
            self.push(BackendEvent::CompileFinished(request.unit.clone()));

            if self.failing_builds.contains(&request.unit) {
                Ok(StepOutcome::Failed(1))
            } else {
                Ok(StepOutcome::Success)
            }
        })
    }

    fn execute<'a>(
        &'a self,
        request: &'a RunRequest,
        _input: &'a mut TerminalInput,
    ) -> BackendFuture<'a> {
        Box::pin(async move {
            if self.unstartable.contains(&request.unit) {
                return Err(anyhow!("no such file: {}", request.program.display()).into());
            }
            self.push(BackendEvent::RunStarted(request.unit.clone(), request.attempt));
            tokio::time::sleep(self.run_delay).await;
            self.push(BackendEvent::RunFinished(request.unit.clone(), request.attempt));
            Ok(StepOutcome::Success)
        })
    }
}
