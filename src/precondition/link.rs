//! Link-safety leaves: file-iterating checks over both directory roots.
//!
//! All five leaves share one scan algorithm, [`FileScan`]: an exit-early
//! guard, vacuous truth when a root is missing, a recursive walk minus
//! exclusions, and a short-circuit on the first violating file. Each leaf
//! supplies only its per-file predicate via [`LinkRule`].

use std::fs;
use std::io;
use std::path::Path;

use crate::error::PreconditionFailure;
use crate::path;
use crate::sync::Backend;

use super::{CheckContext, Precondition, Root};
use crate::finder;

/// Per-file predicate plugged into [`FileScan`].
pub trait LinkRule {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn fulfilled_message(&self) -> &'static str;

    /// Cheap guard evaluated before any filesystem access; returning false
    /// short-circuits the whole check to fulfilled.
    fn applies(&self, _ctx: &CheckContext) -> bool {
        true
    }

    /// Inspect one file; `Some(message)` reports a violation. The message
    /// names the offending path; the scanner adds which root it was under.
    fn violation(
        &self,
        root_dir: &Path,
        file: &Path,
        ctx: &CheckContext,
    ) -> io::Result<Option<String>>;
}

/// Scan-and-predicate engine shared by every link-safety leaf.
pub struct FileScan<R> {
    rule: R,
}

impl<R: LinkRule> FileScan<R> {
    pub fn new(rule: R) -> Self {
        Self { rule }
    }
}

impl<R: LinkRule> Precondition for FileScan<R> {
    fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn description(&self) -> &'static str {
        self.rule.description()
    }

    fn fulfilled_message(&self) -> &'static str {
        self.rule.fulfilled_message()
    }

    fn assert_fulfilled(&self, ctx: &CheckContext) -> Result<(), PreconditionFailure> {
        if !self.rule.applies(ctx) {
            return Ok(());
        }
        // Vacuous truth: with either directory absent there is nothing to
        // violate, and no scan happens at all.
        if !ctx.active.exists() || !ctx.staging.exists() {
            return Ok(());
        }
        for root in [Root::Active, Root::Staging] {
            let dir = root.dir(ctx);
            let files = finder::find_files(dir, ctx.exclusions).map_err(|err| {
                PreconditionFailure::with_source(
                    self.rule.name(),
                    format!(
                        "Could not scan the {} directory at {}: {}",
                        root.label(),
                        dir.display(),
                        err
                    ),
                    err,
                )
            })?;
            for file in files {
                let verdict = self.rule.violation(dir, &file, ctx).map_err(|err| {
                    PreconditionFailure::with_source(
                        self.rule.name(),
                        format!(
                            "Could not check {} in the {} directory: {}",
                            file.display(),
                            root.label(),
                            err
                        ),
                        err,
                    )
                })?;
                if let Some(message) = verdict {
                    return Err(PreconditionFailure::new(
                        self.rule.name(),
                        format!("In the {} directory: {}", root.label(), message),
                    ));
                }
            }
        }
        Ok(())
    }

    fn leaves(&self) -> Vec<&dyn Precondition> {
        vec![self]
    }
}

/// Hard-link count, where the platform exposes it.
fn nlink_exceeds_one(meta: &fs::Metadata) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        meta.nlink() > 1
    }
    #[cfg(not(unix))]
    {
        let _ = meta;
        false
    }
}

/// No symlink may have an absolute raw target. Relative targets are always
/// accepted; hard links are not symlinks and are ignored here.
pub struct NoAbsoluteSymlinks;

impl LinkRule for NoAbsoluteSymlinks {
    fn name(&self) -> &'static str {
        "no-absolute-symlinks"
    }

    fn description(&self) -> &'static str {
        "The codebase contains no symlinks with absolute targets."
    }

    fn fulfilled_message(&self) -> &'static str {
        "There are no absolute symlinks in the codebase."
    }

    fn violation(
        &self,
        _root_dir: &Path,
        file: &Path,
        _ctx: &CheckContext,
    ) -> io::Result<Option<String>> {
        let meta = fs::symlink_metadata(file)?;
        if !meta.file_type().is_symlink() {
            return Ok(None);
        }
        let target = fs::read_link(file)?;
        if target.is_absolute() {
            return Ok(Some(format!(
                "absolute symlink {} -> {}",
                file.display(),
                target.display()
            )));
        }
        Ok(None)
    }
}

/// No regular file may have a link count above one. The file a hard link
/// points at counts as a hard link itself and is equally excludable.
pub struct NoHardLinks;

impl LinkRule for NoHardLinks {
    fn name(&self) -> &'static str {
        "no-hard-links"
    }

    fn description(&self) -> &'static str {
        "The codebase contains no hard links."
    }

    fn fulfilled_message(&self) -> &'static str {
        "There are no hard links in the codebase."
    }

    fn violation(
        &self,
        _root_dir: &Path,
        file: &Path,
        _ctx: &CheckContext,
    ) -> io::Result<Option<String>> {
        let meta = fs::symlink_metadata(file)?;
        if !meta.file_type().is_symlink() && nlink_exceeds_one(&meta) {
            return Ok(Some(format!("hard link {}", file.display())));
        }
        Ok(None)
    }
}

/// Every symlink's resolved target must stay inside the root being scanned.
/// Links within or across sub-packages inside the same root are fine.
pub struct NoSymlinksPointOutside;

impl LinkRule for NoSymlinksPointOutside {
    fn name(&self) -> &'static str {
        "no-symlinks-point-outside-the-codebase"
    }

    fn description(&self) -> &'static str {
        "No symlink resolves to a target outside the codebase."
    }

    fn fulfilled_message(&self) -> &'static str {
        "There are no symlinks pointing outside the codebase."
    }

    fn violation(
        &self,
        root_dir: &Path,
        file: &Path,
        _ctx: &CheckContext,
    ) -> io::Result<Option<String>> {
        let meta = fs::symlink_metadata(file)?;
        if !meta.file_type().is_symlink() {
            return Ok(None);
        }
        let raw = fs::read_link(file)?;
        let parent = file.parent().unwrap_or(root_dir);
        let resolved = if raw.is_absolute() {
            path::normalize(&raw)
        } else {
            path::normalize(&parent.join(&raw))
        };
        let root = path::resolve_cwd(root_dir);
        if resolved == root || path::is_descendant(&root, &resolved) {
            return Ok(None);
        }
        Ok(Some(format!(
            "symlink {} points outside the codebase: {}",
            file.display(),
            resolved.display()
        )))
    }
}

/// No symlink may resolve to a directory. Only needed when the native copy
/// backend is active; rsync's archive mode mirrors directory symlinks
/// faithfully, so the check is skipped there.
pub struct NoSymlinksPointToADirectory;

impl LinkRule for NoSymlinksPointToADirectory {
    fn name(&self) -> &'static str {
        "no-symlinks-point-to-a-directory"
    }

    fn description(&self) -> &'static str {
        "No symlink resolves to a directory."
    }

    fn fulfilled_message(&self) -> &'static str {
        "There are no symlinks pointing to a directory."
    }

    fn applies(&self, ctx: &CheckContext) -> bool {
        ctx.backend == Backend::Native
    }

    fn violation(
        &self,
        _root_dir: &Path,
        file: &Path,
        _ctx: &CheckContext,
    ) -> io::Result<Option<String>> {
        let meta = fs::symlink_metadata(file)?;
        if !meta.file_type().is_symlink() {
            return Ok(None);
        }
        // Broken links resolve to nothing and are not directories.
        if matches!(fs::metadata(file), Ok(target) if target.is_dir()) {
            return Ok(Some(format!(
                "symlink {} points to a directory",
                file.display()
            )));
        }
        Ok(None)
    }
}

/// Windows hosts support neither kind of link here: the first symlink or
/// hard link found is a violation.
pub struct NoLinksOnWindows;

impl LinkRule for NoLinksOnWindows {
    fn name(&self) -> &'static str {
        "no-links-exist-on-windows"
    }

    fn description(&self) -> &'static str {
        "On Windows, the codebase contains no links of any kind."
    }

    fn fulfilled_message(&self) -> &'static str {
        "There are no links in the codebase."
    }

    fn applies(&self, ctx: &CheckContext) -> bool {
        ctx.host.is_windows()
    }

    fn violation(
        &self,
        _root_dir: &Path,
        file: &Path,
        _ctx: &CheckContext,
    ) -> io::Result<Option<String>> {
        let meta = fs::symlink_metadata(file)?;
        if meta.file_type().is_symlink() {
            return Ok(Some(format!(
                "link {} is not supported on Windows",
                file.display()
            )));
        }
        if nlink_exceeds_one(&meta) {
            return Ok(Some(format!(
                "link {} is not supported on Windows",
                file.display()
            )));
        }
        Ok(None)
    }
}
