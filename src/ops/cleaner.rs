//! The `clean` operation: discard the staging copy.

use std::fs;

use crate::error::{Error, Result};
use crate::precondition::tree::{cleaner_preconditions, PreconditionTree};
use crate::precondition::{CheckContext, Precondition};

pub struct Cleaner {
    preconditions: PreconditionTree,
}

impl Cleaner {
    pub fn new() -> Self {
        Self {
            preconditions: cleaner_preconditions(),
        }
    }

    /// Remove the staging directory and everything under it.
    pub fn clean(&self, ctx: &CheckContext) -> Result<()> {
        self.preconditions.assert_fulfilled(ctx)?;
        fs::remove_dir_all(ctx.staging).map_err(|err| Error::Io {
            context: format!(
                "could not remove the staging directory {}",
                ctx.staging.display()
            ),
            source: err,
        })?;
        Ok(())
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}
