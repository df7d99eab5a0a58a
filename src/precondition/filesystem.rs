//! Directory-state leaves: existence, writability, distinctness, nesting.

use std::fs;

use crate::error::PreconditionFailure;
use crate::path;

use super::{CheckContext, Precondition, Root};

/// The targeted directory exists. No traversal.
pub struct DirectoryExists {
    root: Root,
}

impl DirectoryExists {
    pub fn active() -> Self {
        Self { root: Root::Active }
    }

    pub fn staging() -> Self {
        Self {
            root: Root::Staging,
        }
    }
}

impl Precondition for DirectoryExists {
    fn name(&self) -> &'static str {
        match self.root {
            Root::Active => "active-dir-exists",
            Root::Staging => "staging-dir-exists",
        }
    }

    fn description(&self) -> &'static str {
        match self.root {
            Root::Active => "The active directory exists.",
            Root::Staging => "The staging directory exists.",
        }
    }

    fn fulfilled_message(&self) -> &'static str {
        match self.root {
            Root::Active => "The active directory exists.",
            Root::Staging => "The staging directory exists.",
        }
    }

    fn assert_fulfilled(&self, ctx: &CheckContext) -> Result<(), PreconditionFailure> {
        let dir = self.root.dir(ctx);
        if dir.is_dir() {
            return Ok(());
        }
        Err(PreconditionFailure::new(
            self.name(),
            format!(
                "The {} directory does not exist: {}",
                self.root.label(),
                dir.display()
            ),
        ))
    }

    fn leaves(&self) -> Vec<&dyn Precondition> {
        vec![self]
    }
}

/// The targeted directory is writable.
///
/// Checked by writing and removing a probe file; permission bits alone are
/// not trustworthy across filesystems.
pub struct DirectoryWritable {
    root: Root,
}

impl DirectoryWritable {
    pub fn active() -> Self {
        Self { root: Root::Active }
    }

    pub fn staging() -> Self {
        Self {
            root: Root::Staging,
        }
    }
}

const WRITE_PROBE: &str = ".stagehand-write-probe";

impl Precondition for DirectoryWritable {
    fn name(&self) -> &'static str {
        match self.root {
            Root::Active => "active-dir-is-writable",
            Root::Staging => "staging-dir-is-writable",
        }
    }

    fn description(&self) -> &'static str {
        match self.root {
            Root::Active => "The active directory is writable.",
            Root::Staging => "The staging directory is writable.",
        }
    }

    fn fulfilled_message(&self) -> &'static str {
        match self.root {
            Root::Active => "The active directory is writable.",
            Root::Staging => "The staging directory is writable.",
        }
    }

    fn assert_fulfilled(&self, ctx: &CheckContext) -> Result<(), PreconditionFailure> {
        let dir = self.root.dir(ctx);
        let probe = dir.join(WRITE_PROBE);
        match fs::write(&probe, b"probe") {
            Ok(()) => {
                let _ = fs::remove_file(&probe);
                Ok(())
            }
            Err(err) => Err(PreconditionFailure::with_source(
                self.name(),
                format!(
                    "The {} directory is not writable: {}",
                    self.root.label(),
                    dir.display()
                ),
                err,
            )),
        }
    }

    fn leaves(&self) -> Vec<&dyn Precondition> {
        vec![self]
    }
}

/// The staging directory does not exist yet (required before `begin`).
pub struct StagingDirDoesNotExist;

impl Precondition for StagingDirDoesNotExist {
    fn name(&self) -> &'static str {
        "staging-dir-does-not-exist"
    }

    fn description(&self) -> &'static str {
        "The staging directory does not exist yet."
    }

    fn fulfilled_message(&self) -> &'static str {
        "The staging directory does not exist yet."
    }

    fn assert_fulfilled(&self, ctx: &CheckContext) -> Result<(), PreconditionFailure> {
        if !ctx.staging.exists() {
            return Ok(());
        }
        Err(PreconditionFailure::new(
            self.name(),
            format!(
                "The staging directory already exists: {}",
                ctx.staging.display()
            ),
        ))
    }

    fn leaves(&self) -> Vec<&dyn Precondition> {
        vec![self]
    }
}

/// Active and staging resolve to different paths.
pub struct DirsAreDifferent;

impl Precondition for DirsAreDifferent {
    fn name(&self) -> &'static str {
        "active-and-staging-dirs-are-different"
    }

    fn description(&self) -> &'static str {
        "The active and staging directories are different."
    }

    fn fulfilled_message(&self) -> &'static str {
        "The active and staging directories are different."
    }

    fn assert_fulfilled(&self, ctx: &CheckContext) -> Result<(), PreconditionFailure> {
        let active = path::resolve_cwd(ctx.active);
        let staging = path::resolve_cwd(ctx.staging);
        if active != staging {
            return Ok(());
        }
        Err(PreconditionFailure::new(
            self.name(),
            format!(
                "The active and staging directories are the same: {}",
                active.display()
            ),
        ))
    }

    fn leaves(&self) -> Vec<&dyn Precondition> {
        vec![self]
    }
}

/// On Windows, neither directory may be nested inside the other.
pub struct NoNestingOnWindows;

impl Precondition for NoNestingOnWindows {
    fn name(&self) -> &'static str {
        "no-nesting-on-windows"
    }

    fn description(&self) -> &'static str {
        "On Windows, the active and staging directories are not nested."
    }

    fn fulfilled_message(&self) -> &'static str {
        "The active and staging directories are not nested on Windows."
    }

    fn assert_fulfilled(&self, ctx: &CheckContext) -> Result<(), PreconditionFailure> {
        if !ctx.host.is_windows() {
            return Ok(());
        }
        let active = path::resolve_cwd(ctx.active);
        let staging = path::resolve_cwd(ctx.staging);
        if path::is_descendant(&active, &staging) {
            return Err(PreconditionFailure::new(
                self.name(),
                format!(
                    "On Windows, the staging directory cannot be inside the active directory: {} is inside {}",
                    staging.display(),
                    active.display()
                ),
            ));
        }
        if path::is_descendant(&staging, &active) {
            return Err(PreconditionFailure::new(
                self.name(),
                format!(
                    "On Windows, the active directory cannot be inside the staging directory: {} is inside {}",
                    active.display(),
                    staging.display()
                ),
            ));
        }
        Ok(())
    }

    fn leaves(&self) -> Vec<&dyn Precondition> {
        vec![self]
    }
}
