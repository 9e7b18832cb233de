// src/discover/walker.rs

//! Lazy depth-first walk over the submission tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::config::BatchConfig;
use crate::discover::matcher::{PathFilter, SourceMatcher};
use crate::errors::{BatchError, Result};
use crate::fs::FileSystem;
use crate::types::{TraversalMode, Unit};

/// Entries of one directory that are still to be visited.
#[derive(Debug)]
struct DirCursor {
    entries: std::vec::IntoIter<PathBuf>,
}

impl DirCursor {
    /// Skip whatever is left in this directory.
    fn exhaust(&mut self) {
        self.entries = Vec::new().into_iter();
    }
}

enum Visit {
    Skip,
    Descend(PathBuf),
    Found(Unit),
}

/// Iterator over matching source files, in depth-first lexical order.
///
/// Entries of every directory are sorted by file name and visited with files
/// and subdirectories interleaved, so the yielded order equals the
/// component-wise sort order of the paths.
///
/// One match per submission directory: once a file matches inside a
/// directory below the root, the remaining entries of that directory are
/// skipped. The root itself is a roster, not a submission, so files placed
/// directly in it are all considered.
///
/// Any I/O error ends the iteration after being yielded once.
#[derive(Debug)]
pub struct Discovery {
    fs: Arc<dyn FileSystem>,
    matcher: SourceMatcher,
    filter: PathFilter,
    /// Flat mode only: identifier not yet seen in any entry name.
    pending_start: Option<String>,
    stack: Vec<DirCursor>,
    finished: bool,
}

impl Discovery {
    /// Open the root and resolve the starting identifier.
    ///
    /// Fails if the root cannot be read, or in `StudentDirs` mode if no
    /// top-level directory contains the starting identifier.
    pub fn new(fs: Arc<dyn FileSystem>, cfg: &BatchConfig) -> Result<Self> {
        let matcher = SourceMatcher::from_config(cfg);
        let filter = PathFilter::from_config(cfg)?;

        let mut root_entries = sorted_entries(fs.as_ref(), &cfg.root)?;
        let mut pending_start = None;

        if let Some(id) = cfg.student.as_deref() {
            match cfg.mode {
                TraversalMode::Flat => pending_start = Some(id.to_string()),
                TraversalMode::StudentDirs => {
                    let resume = resume_point(fs.as_ref(), &filter, &root_entries, id)?;
                    info!(student = id, dir = ?resume, "resuming batch at student directory");
                    root_entries.retain(|p| p.file_name() >= resume.file_name());
                }
            }
        }

        Ok(Self {
            fs,
            matcher,
            filter,
            pending_start,
            stack: vec![DirCursor {
                entries: root_entries.into_iter(),
            }],
            finished: false,
        })
    }

    fn visit(&mut self, path: PathBuf) -> Visit {
        let name = file_name_lossy(&path);
        let is_dir = self.fs.is_dir(&path);

        if self.filter.is_excluded(&path, is_dir) {
            trace!(?path, "excluded");
            return Visit::Skip;
        }

        if let Some(id) = self.pending_start.as_deref() {
            if name.contains(id) {
                info!(student = id, ?path, "reached starting identifier");
                self.pending_start = None;
            } else if is_dir {
                return Visit::Descend(path);
            } else {
                return Visit::Skip;
            }
        }

        if is_dir {
            Visit::Descend(path)
        } else if self.fs.is_file(&path) && self.matcher.matches(&name) {
            Visit::Found(Unit::new(path))
        } else {
            Visit::Skip
        }
    }

    fn fail(&mut self, err: BatchError) -> Option<Result<Unit>> {
        self.finished = true;
        Some(Err(err))
    }
}

impl Iterator for Discovery {
    type Item = Result<Unit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let next = match self.stack.last_mut() {
                Some(cursor) => cursor.entries.next(),
                None => {
                    self.finished = true;
                    return self.pending_start.take().map(|id| Err(BatchError::StartNotFound(id)));
                }
            };

            let Some(path) = next else {
                self.stack.pop();
                continue;
            };

            match self.visit(path) {
                Visit::Skip => {}
                Visit::Descend(dir) => match sorted_entries(self.fs.as_ref(), &dir) {
                    Ok(entries) => self.stack.push(DirCursor {
                        entries: entries.into_iter(),
                    }),
                    Err(e) => return self.fail(e),
                },
                Visit::Found(unit) => {
                    if self.stack.len() > 1 {
                        if let Some(cursor) = self.stack.last_mut() {
                            cursor.exhaust();
                        }
                    }
                    debug!(unit = %unit.name, source = ?unit.source, "discovered submission");
                    return Some(Ok(unit));
                }
            }
        }
    }
}

fn sorted_entries(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs.read_dir(dir)?;
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}

/// First top-level directory (lexically) whose name contains `id`.
fn resume_point(
    fs: &dyn FileSystem,
    filter: &PathFilter,
    root_entries: &[PathBuf],
    id: &str,
) -> Result<PathBuf> {
    root_entries
        .iter()
        .find(|p| fs.is_dir(p) && !filter.is_excluded(p, true) && file_name_lossy(p).contains(id))
        .cloned()
        .ok_or_else(|| BatchError::StartNotFound(id.to_string()))
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
