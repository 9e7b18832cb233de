// src/exec/run.rs

//! Running a built unit, possibly several times.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{BatchConfig, InputGroup};
use crate::exec::backend::{ProcessBackend, RunRequest};
use crate::exec::input::TerminalInput;
use crate::types::{StepOutcome, Unit};

/// Consumer side of the pipeline: executes each built program `times` times.
pub struct Runner<B: ProcessBackend> {
    config: Arc<BatchConfig>,
    backend: Arc<B>,
}

impl<B: ProcessBackend> Runner<B> {
    pub fn new(config: Arc<BatchConfig>, backend: Arc<B>) -> Self {
        Self { config, backend }
    }

    pub fn run_request(&self, unit: &Unit, attempt: usize) -> RunRequest {
        let program = unit
            .build_path
            .clone()
            .unwrap_or_else(|| self.config.output_dir.join(unit.stem()));
        RunRequest {
            unit: unit.name.clone(),
            program,
            args: Vec::new(),
            cwd: self.config.root.clone(),
            kill_char: self.config.kill_char,
            attempt,
            preset: self
                .config
                .input_groups
                .get(attempt - 1)
                .map(InputGroup::to_bytes)
                .unwrap_or_default(),
        }
    }

    /// Run `unit` once per configured repeat, in order.
    ///
    /// Each run is a fresh process. Failures, kills and spawn errors are
    /// reported and recorded; they never stop the remaining repeats.
    pub async fn run_unit(&self, unit: &Unit, input: &mut TerminalInput) -> Vec<StepOutcome> {
        println!("\n{}", unit.name);

        let mut outcomes = Vec::with_capacity(self.config.times);
        for attempt in 1..=self.config.times {
            let request = self.run_request(unit, attempt);
            let outcome = match self.backend.execute(&request, input).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(unit = %unit.name, attempt, error = %err, "program could not be run");
                    StepOutcome::Failed(-1)
                }
            };

            match outcome {
                StepOutcome::Success => info!(unit = %unit.name, attempt, "program finished"),
                StepOutcome::Killed => warn!(unit = %unit.name, attempt, "program killed by operator"),
                other => warn!(unit = %unit.name, attempt, outcome = %other, "program failed"),
            }
            outcomes.push(outcome);
        }

        println!();
        outcomes
    }
}
