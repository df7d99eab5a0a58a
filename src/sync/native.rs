//! Dependency-free native synchronization fallback.
//!
//! Mirrors the source onto the destination in two strictly ordered passes:
//! a copy pass (directories created, empty ones included; files and
//! symlinks copied, overwriting), then a delete-after pass that prunes
//! destination entries with no source counterpart. The destination is never
//! observed with fewer files than before the call until that final pass.
//!
//! Known limitation: a symlink pointing at a directory is recreated as a
//! raw link and never traversed, so its subtree is not mirrored through it.
//! Callers needing faithful directory-symlink handling use the rsync
//! backend; the `no-symlinks-point-to-a-directory` precondition guards this
//! backend for exactly that reason.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::SyncError;

use super::{prepare, FileSyncer, PreparedSync, SyncRequest};

pub struct NativeFileSyncer;

/// Wall-clock bound checked between entries. Atomicity is per-file: the
/// entry in flight finishes before the timeout is reported.
struct Deadline {
    at: Instant,
    limit: Duration,
}

impl Deadline {
    fn new(timeout: Option<Duration>) -> Option<Self> {
        timeout.map(|limit| Self {
            at: Instant::now() + limit,
            limit,
        })
    }
}

fn check_deadline(deadline: &Option<Deadline>) -> Result<(), SyncError> {
    if let Some(deadline) = deadline {
        if Instant::now() >= deadline.at {
            return Err(SyncError::Timeout {
                limit: deadline.limit,
            });
        }
    }
    Ok(())
}

type Progress<'a, 'b> = Option<&'a mut (dyn FnMut(&str) + 'b)>;

fn emit(progress: &mut Progress, line: &str) {
    if let Some(callback) = progress.as_mut() {
        callback(line);
    }
}

impl FileSyncer for NativeFileSyncer {
    fn sync(
        &self,
        request: &SyncRequest,
        mut progress: Option<&mut dyn FnMut(&str)>,
    ) -> Result<(), SyncError> {
        let prepared = prepare(request)?;
        let deadline = Deadline::new(request.timeout);
        debug!(
            source = %prepared.source.display(),
            destination = %prepared.destination.display(),
            "native sync"
        );
        copy_pass(&prepared, &deadline, &mut progress)?;
        delete_pass(&prepared, &deadline, &mut progress)?;
        Ok(())
    }
}

fn copy_pass(
    prepared: &PreparedSync,
    deadline: &Option<Deadline>,
    progress: &mut Progress,
) -> Result<(), SyncError> {
    let mut walker = WalkDir::new(&prepared.source)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        check_deadline(deadline)?;
        let entry = entry.map_err(|err| walk_error("source", err))?;
        let rel = match entry.path().strip_prefix(&prepared.source) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };
        if prepared.exclusions.matches(&rel) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        let target = prepared.destination.join(&rel);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            // A file or symlink occupying the target path must give way.
            if let Ok(meta) = fs::symlink_metadata(&target) {
                if !meta.is_dir() {
                    remove_existing(&target)?;
                }
            }
            fs::create_dir_all(&target).map_err(|err| {
                SyncError::io(
                    format!("could not create directory {}", target.display()),
                    err,
                )
            })?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            emit(progress, &rel.to_string_lossy());
        } else {
            copy_file(entry.path(), &target)?;
            emit(progress, &rel.to_string_lossy());
        }
    }
    Ok(())
}

fn delete_pass(
    prepared: &PreparedSync,
    deadline: &Option<Deadline>,
    progress: &mut Progress,
) -> Result<(), SyncError> {
    let mut walker = WalkDir::new(&prepared.destination)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        check_deadline(deadline)?;
        let entry = entry.map_err(|err| walk_error("destination", err))?;
        let rel = match entry.path().strip_prefix(&prepared.destination) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };
        if prepared.exclusions.matches(&rel) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        // Anything with a source counterpart survives, including broken
        // symlinks; symlink_metadata sees those.
        if fs::symlink_metadata(prepared.source.join(&rel)).is_ok() {
            continue;
        }

        if entry.file_type().is_dir() {
            fs::remove_dir_all(entry.path()).map_err(|err| {
                SyncError::io(
                    format!("could not remove stale directory {}", entry.path().display()),
                    err,
                )
            })?;
            walker.skip_current_dir();
        } else {
            fs::remove_file(entry.path()).map_err(|err| {
                SyncError::io(
                    format!("could not remove stale file {}", entry.path().display()),
                    err,
                )
            })?;
        }
        emit(progress, &format!("deleting {}", rel.to_string_lossy()));
    }
    Ok(())
}

/// Recreate a symlink with its raw target, replacing whatever sits at the
/// destination path.
fn copy_symlink(source: &Path, target: &Path) -> Result<(), SyncError> {
    let raw = fs::read_link(source).map_err(|err| {
        SyncError::io(format!("could not read symlink {}", source.display()), err)
    })?;
    remove_existing(target)?;
    #[cfg(unix)]
    std::os::unix::fs::symlink(&raw, target).map_err(|err| {
        SyncError::io(format!("could not create symlink {}", target.display()), err)
    })?;
    #[cfg(windows)]
    std::os::windows::fs::symlink_file(&raw, target).map_err(|err| {
        SyncError::io(format!("could not create symlink {}", target.display()), err)
    })?;
    Ok(())
}

/// Copy one regular file, overwriting the destination entry.
fn copy_file(source: &Path, target: &Path) -> Result<(), SyncError> {
    // A directory or symlink at the target must go first; writing through
    // a symlink would modify the file it points at instead.
    if let Ok(meta) = fs::symlink_metadata(target) {
        if meta.is_dir() || meta.file_type().is_symlink() {
            remove_existing(target)?;
        }
    }
    fs::copy(source, target).map_err(|err| {
        SyncError::io(
            format!(
                "could not copy {} to {}",
                source.display(),
                target.display()
            ),
            err,
        )
    })?;
    Ok(())
}

fn remove_existing(target: &Path) -> Result<(), SyncError> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(target).map_err(|err| {
            SyncError::io(format!("could not remove {}", target.display()), err)
        }),
        Ok(_) => fs::remove_file(target).map_err(|err| {
            SyncError::io(format!("could not remove {}", target.display()), err)
        }),
        Err(_) => Ok(()),
    }
}

fn walk_error(which: &str, err: walkdir::Error) -> SyncError {
    let context = match err.path() {
        Some(path) => format!("could not walk the {which} tree at {}", path.display()),
        None => format!("could not walk the {which} tree"),
    };
    match err.into_io_error() {
        Some(io_err) => SyncError::io(context, io_err),
        None => SyncError::io(context, io::Error::other("filesystem loop")),
    }
}
