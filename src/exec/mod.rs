// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `ProcessBackend` trait and the
//!   `tokio::process` implementation used in production.
//! - [`build`] compiles a unit on the producer side of the pipeline.
//! - [`archive`] copies sources into the archive directory off the hot path.
//! - [`run`] executes built programs on the consumer side.
//! - [`input`] owns terminal input and the kill-line forwarder.

pub mod archive;
pub mod backend;
pub mod build;
pub mod input;
pub mod run;

pub use backend::{CompileRequest, ProcessBackend, RealProcessBackend, RunRequest};
pub use build::{BuiltUnit, Builder};
pub use input::TerminalInput;
pub use run::Runner;
