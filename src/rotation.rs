// Log rotation: keep only the `keep` most recently modified files of a
// directory and delete the rest, oldest first.
//
// Rotation is housekeeping. It never stops at the first failed deletion:
// every planned removal is attempted and the failures are reported together
// so the caller can log them and carry on.
//
// Only regular files count. Symlinks are never followed, ranked or removed,
// and an entry whose metadata cannot be read is skipped with a warning.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, warn};

/// A regular file found in the rotated directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        FileEntry {
            path: path.into(),
            modified,
        }
    }

    fn name(&self) -> &OsStr {
        self.path.file_name().unwrap_or(self.path.as_os_str())
    }
}

/// Files that were deleted by a successful rotation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RotationReport {
    pub removed: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for RemovalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.source)
    }
}

#[derive(Debug, Error)]
pub enum RotationError {
    #[error("log directory {0} not found")]
    DirectoryNotFound(PathBuf),

    #[error("failed to list {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "failed to remove {} of {} file(s): {}",
        .failures.len(),
        .failures.len() + .removed.len(),
        join_failures(.failures)
    )]
    Incomplete {
        removed: Vec<PathBuf>,
        failures: Vec<RemovalFailure>,
    },
}

fn join_failures(failures: &[RemovalFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Deletes a single file. Rotation goes through this so a failing
/// filesystem can be stood in for.
pub trait FileRemover {
    fn remove(&mut self, path: &Path) -> io::Result<()>;
}

/// Removes files from the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove(&mut self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Oldest first; equal timestamps fall back to the file name so the order
/// never depends on what `read_dir` happened to return.
fn oldest_first(a: &FileEntry, b: &FileEntry) -> Ordering {
    a.modified
        .cmp(&b.modified)
        .then_with(|| a.name().cmp(b.name()))
        .then_with(|| a.path.cmp(&b.path))
}

/// Select the entries to delete so that at most `keep` remain. The result is
/// in deletion order.
pub fn plan(mut entries: Vec<FileEntry>, keep: usize) -> Vec<FileEntry> {
    if entries.len() <= keep {
        return Vec::new();
    }
    entries.sort_by(oldest_first);
    let excess = entries.len() - keep;
    entries.truncate(excess);
    entries
}

/// List the regular files directly inside `dir`. Subdirectories, symlinks
/// and entries that cannot be inspected are skipped.
pub fn list_files(dir: &Path) -> Result<Vec<FileEntry>, RotationError> {
    if !dir.is_dir() {
        return Err(RotationError::DirectoryNotFound(dir.to_path_buf()));
    }
    let read_err = |source| RotationError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let modified = match fs::symlink_metadata(&path) {
            Ok(m) if m.is_file() => m.modified(),
            Ok(_) => continue,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => Err(e),
        };
        match modified {
            Ok(modified) => files.push(FileEntry::new(path, modified)),
            Err(e) => warn!(file = %path.display(), error = %e, "skipping file in rotation"),
        }
    }
    Ok(files)
}

/// Rotate `dir` on the real filesystem.
pub fn rotate(dir: &Path, keep: usize) -> Result<RotationReport, RotationError> {
    rotate_with(dir, keep, &mut FsRemover)
}

/// Rotate `dir`, deleting through `remover`. Every planned deletion is
/// attempted even when earlier ones fail.
pub fn rotate_with(
    dir: &Path,
    keep: usize,
    remover: &mut dyn FileRemover,
) -> Result<RotationReport, RotationError> {
    let planned = plan(list_files(dir)?, keep);

    let mut removed = Vec::with_capacity(planned.len());
    let mut failures = Vec::new();
    for entry in planned {
        match remover.remove(&entry.path) {
            Ok(()) => {
                debug!(file = %entry.path.display(), "removed old log");
                removed.push(entry.path);
            }
            Err(source) => {
                warn!(file = %entry.path.display(), error = %source, "failed to remove old log");
                failures.push(RemovalFailure {
                    path: entry.path,
                    source,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(RotationReport { removed })
    } else {
        Err(RotationError::Incomplete { removed, failures })
    }
}
