// src/exec/archive.rs

//! Copying submission sources into the archive directory.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use blake3::Hasher;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::fs::FileSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Copied,
    /// The archive already held identical content.
    Unchanged,
}

/// Compute the blake3 digest of a file's contents.
pub fn content_digest(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Copy `source` to `dest`, skipping the write when `dest` already has the
/// same content (e.g. when a batch is resumed).
pub fn archive_source(fs: &dyn FileSystem, source: &Path, dest: &Path) -> Result<ArchiveOutcome> {
    if fs.is_file(dest) && content_digest(fs, source)? == content_digest(fs, dest)? {
        return Ok(ArchiveOutcome::Unchanged);
    }

    let contents = crate::fs::read_all(fs, source)?;
    fs.write(dest, &contents)
        .with_context(|| format!("archiving {:?} to {:?}", source, dest))?;
    Ok(ArchiveOutcome::Copied)
}

/// Archive a source on the blocking pool without waiting for it.
///
/// Failures are reported and otherwise ignored; a missing archive copy never
/// affects building or running.
pub fn spawn_archive(fs: Arc<dyn FileSystem>, source: PathBuf, dest: PathBuf) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || match archive_source(fs.as_ref(), &source, &dest) {
        Ok(outcome) => debug!(?source, ?dest, ?outcome, "archived source"),
        Err(e) => warn!(?source, error = %e, "failed to archive source"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn copies_then_recognises_identical_content() {
        let fs = MockFileSystem::new();
        fs.add_file("root/abc/abc_q1.cpp", "int main() { return 0; }");
        fs.add_dir("root/cpps");

        let src = PathBuf::from("root/abc/abc_q1.cpp");
        let dest = PathBuf::from("root/cpps/abc_q1.cpp");

        assert_eq!(archive_source(&fs, &src, &dest).unwrap(), ArchiveOutcome::Copied);
        assert_eq!(fs.contents(&dest), Some(b"int main() { return 0; }".to_vec()));
        assert_eq!(archive_source(&fs, &src, &dest).unwrap(), ArchiveOutcome::Unchanged);
    }

    #[test]
    fn changed_submission_overwrites_archive() {
        let fs = MockFileSystem::new();
        fs.add_file("root/abc/abc_q1.cpp", "v2");
        fs.add_file("root/cpps/abc_q1.cpp", "v1");

        let dest = PathBuf::from("root/cpps/abc_q1.cpp");
        let outcome = archive_source(&fs, Path::new("root/abc/abc_q1.cpp"), &dest).unwrap();

        assert_eq!(outcome, ArchiveOutcome::Copied);
        assert_eq!(fs.contents(&dest), Some(b"v2".to_vec()));
    }

    #[test]
    fn digest_is_content_based() {
        let fs = MockFileSystem::new();
        fs.add_file("a.cpp", "hello world");
        fs.add_file("b.cpp", "hello world");

        assert_eq!(
            content_digest(&fs, Path::new("a.cpp")).unwrap(),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
        assert_eq!(
            content_digest(&fs, Path::new("a.cpp")).unwrap(),
            content_digest(&fs, Path::new("b.cpp")).unwrap()
        );
    }
}
