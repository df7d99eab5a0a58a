//! Readiness checks gating every staging operation.
//!
//! A [`Precondition`] is either a terminal leaf or a
//! [`tree::PreconditionTree`] aggregating children. Evaluation is pure with
//! respect to the check itself: leaves hold no mutable state and are safe to
//! call repeatedly. `is_fulfilled` never errors; every underlying problem is
//! folded into an unfulfilled verdict whose failure keeps the original error
//! as source.

pub mod filesystem;
pub mod host_tools;
pub mod link;
pub mod tree;

use std::path::Path;
use std::time::Duration;

use crate::error::PreconditionFailure;
use crate::exclusions::PathList;
use crate::host::Host;
use crate::sync::Backend;

/// Everything a check may consult, passed explicitly per evaluation.
pub struct CheckContext<'a> {
    /// The live codebase being protected.
    pub active: &'a Path,
    /// The isolated working copy.
    pub staging: &'a Path,
    /// Paths to skip during file-iterating scans.
    pub exclusions: &'a PathList,
    /// Wall-clock bound for checks that spawn processes.
    pub timeout: Option<Duration>,
    /// Host environment seam.
    pub host: &'a dyn Host,
    /// The synchronization backend in use; some link-safety checks only
    /// apply to one of them.
    pub backend: Backend,
}

/// Which scanned root an offending file was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    Active,
    Staging,
}

impl Root {
    pub fn label(self) -> &'static str {
        match self {
            Root::Active => "active",
            Root::Staging => "staging",
        }
    }

    pub fn dir<'a>(self, ctx: &CheckContext<'a>) -> &'a Path {
        match self {
            Root::Active => ctx.active,
            Root::Staging => ctx.staging,
        }
    }
}

/// A named, composable readiness check.
pub trait Precondition {
    /// Stable machine name, e.g. `active-dir-exists`.
    fn name(&self) -> &'static str;

    /// What the check protects, in one sentence.
    fn description(&self) -> &'static str;

    /// Status message when the check holds.
    fn fulfilled_message(&self) -> &'static str;

    /// Evaluate, returning the first violation found.
    fn assert_fulfilled(&self, ctx: &CheckContext) -> Result<(), PreconditionFailure>;

    /// Boolean form; never errors.
    fn is_fulfilled(&self, ctx: &CheckContext) -> bool {
        self.assert_fulfilled(ctx).is_ok()
    }

    /// The fulfilled message, or the first failure's message.
    fn status_message(&self, ctx: &CheckContext) -> String {
        match self.assert_fulfilled(ctx) {
            Ok(()) => self.fulfilled_message().to_string(),
            Err(failure) => failure.message,
        }
    }

    /// Flattened, order-preserving list of terminal leaves. A leaf returns
    /// itself; a tree concatenates its children's leaves.
    fn leaves(&self) -> Vec<&dyn Precondition>;
}
