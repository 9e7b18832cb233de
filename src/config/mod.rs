// src/config/mod.rs

//! Configuration for a batch.
//!
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file and merge CLI flags over it (`loader.rs`).
//! - Validate into a [`BatchConfig`] (`validate.rs`).
//! - Scripted per-run input (`inputs.rs`).

pub mod inputs;
pub mod loader;
pub mod model;
pub mod validate;

pub use inputs::{InputGroup, InputScript, load_input_script};
pub use loader::{apply_cli_overrides, load_and_validate, load_from_path, resolve_config};
pub use model::{BatchConfig, BatchSection, LayoutSection, RawConfigFile};
