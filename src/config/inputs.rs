// src/config/inputs.rs

//! Scripted input for graded runs.
//!
//! An input script holds one group of lines per repeat. Group `i` is typed
//! into run `i` before the operator's own input is forwarded:
//!
//! ```toml
//! [[run]]
//! lines = ["90", "60"]
//!
//! [[run]]
//! lines = ["135", "71"]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputScript {
    #[serde(default)]
    pub run: Vec<InputGroup>,
}

/// Lines sent to a single run, each followed by a newline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputGroup {
    #[serde(default)]
    pub lines: Vec<String>,
}

impl InputGroup {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        for line in &self.lines {
            bytes.extend_from_slice(line.as_bytes());
            bytes.push(b'\n');
        }
        bytes
    }
}

pub fn load_input_script(path: impl AsRef<Path>) -> Result<InputScript> {
    let contents = fs::read_to_string(path.as_ref())?;
    let script: InputScript = toml::from_str(&contents)?;
    Ok(script)
}
