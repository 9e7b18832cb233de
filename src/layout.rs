// src/layout.rs

//! Output and archive directories under the batch root.

use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::config::BatchConfig;
use crate::errors::{BatchError, Result};
use crate::fs::FileSystem;

/// Make sure the binary output directory and the source archive directory
/// exist under the root.
///
/// A directory that already exists is fine. Any other failure (missing root,
/// permissions, a plain file in the way) is fatal for the batch.
pub fn prepare_layout(fs: &dyn FileSystem, cfg: &BatchConfig) -> Result<()> {
    ensure_dir(fs, &cfg.output_dir)?;
    ensure_dir(fs, &cfg.archive_dir)?;
    Ok(())
}

fn ensure_dir(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    match fs.create_dir(path) {
        Ok(()) => {
            info!(dir = ?path, "created directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if fs.is_dir(path) {
                debug!(dir = ?path, "directory already present");
                Ok(())
            } else {
                Err(BatchError::DirCreate {
                    path: path.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "path exists but is not a directory",
                    ),
                })
            }
        }
        Err(source) => Err(BatchError::DirCreate {
            path: path.to_path_buf(),
            source,
        }),
    }
}
