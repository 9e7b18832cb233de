// src/engine/report.rs

use tracing::{info, warn};

use crate::types::{StepOutcome, Unit};

/// Everything that happened to one unit during the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRecord {
    pub unit: Unit,
    pub build: StepOutcome,
    /// One entry per repeat; empty when the build failed.
    pub runs: Vec<StepOutcome>,
}

impl UnitRecord {
    pub fn is_clean(&self) -> bool {
        self.build.is_success() && self.runs.iter().all(StepOutcome::is_success)
    }
}

/// Units processed so far, in the order they were run.
#[derive(Debug, Default)]
pub struct BatchReport {
    records: Vec<UnitRecord>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, unit: Unit, build: StepOutcome, runs: Vec<StepOutcome>) {
        self.records.push(UnitRecord { unit, build, runs });
    }

    pub fn records(&self) -> &[UnitRecord] {
        &self.records
    }

    /// Display names in processing order.
    pub fn unit_names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.unit.name.as_str()).collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitRecord> {
        self.records.iter().filter(|r| !r.is_clean())
    }

    /// Log one line per unit that failed to build or had a bad run.
    pub fn log_summary(&self) {
        let failed: Vec<_> = self.failures().collect();
        info!(
            units = self.records.len(),
            failed = failed.len(),
            "batch finished"
        );
        for record in failed {
            if !record.build.is_success() {
                warn!(unit = %record.unit.name, outcome = %record.build, "build failed");
                continue;
            }
            let runs: Vec<String> = record.runs.iter().map(ToString::to_string).collect();
            warn!(unit = %record.unit.name, runs = ?runs, "run failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn unit(name: &str) -> Unit {
        Unit::new(PathBuf::from(format!("root/{name}")))
    }

    #[test]
    fn failures_cover_build_and_run_problems() {
        let mut report = BatchReport::new();
        report.record(unit("a_q1.cpp"), StepOutcome::Success, vec![StepOutcome::Success; 2]);
        report.record(unit("b_q1.cpp"), StepOutcome::Failed(1), Vec::new());
        report.record(
            unit("c_q1.cpp"),
            StepOutcome::Success,
            vec![StepOutcome::Success, StepOutcome::Killed],
        );

        let failed: Vec<_> = report.failures().map(|r| r.unit.name.as_str()).collect();
        assert_eq!(failed, vec!["b_q1.cpp", "c_q1.cpp"]);
        assert_eq!(report.unit_names(), vec!["a_q1.cpp", "b_q1.cpp", "c_q1.cpp"]);
    }
}
