// src/engine/mod.rs

//! Orchestration of a batch.
//!
//! [`pipeline`] couples discovery, building and running; [`report`] keeps
//! track of what happened to each unit.

pub mod pipeline;
pub mod report;

pub use pipeline::Pipeline;
pub use report::{BatchReport, UnitRecord};
