// src/discover/mod.rs

//! Finding submissions under the batch root.
//!
//! - [`matcher`] decides which file names are sources and which paths are
//!   off limits.
//! - [`walker`] turns the tree into an ordered, lazy stream of [`Unit`]s.
//!
//! [`Unit`]: crate::types::Unit

pub mod matcher;
pub mod walker;

pub use matcher::{PathFilter, SourceMatcher, TAG_SEPARATOR};
pub use walker::Discovery;
