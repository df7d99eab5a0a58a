//! The `begin` operation: create the staging copy.

use crate::error::Result;
use crate::precondition::tree::{beginner_preconditions, PreconditionTree};
use crate::precondition::{CheckContext, Precondition};
use crate::sync::{syncer_for, Backend, FileSyncer, SyncRequest};

pub struct Beginner {
    preconditions: PreconditionTree,
    syncer: Box<dyn FileSyncer>,
}

impl Beginner {
    pub fn new(backend: Backend) -> Self {
        Self {
            preconditions: beginner_preconditions(),
            syncer: syncer_for(backend),
        }
    }

    /// Mirror the active directory into a brand-new staging directory.
    pub fn begin(
        &self,
        ctx: &CheckContext,
        progress: Option<&mut dyn FnMut(&str)>,
    ) -> Result<()> {
        self.preconditions.assert_fulfilled(ctx)?;
        let request = SyncRequest {
            source: ctx.active,
            destination: ctx.staging,
            exclusions: ctx.exclusions,
            timeout: ctx.timeout,
        };
        self.syncer.sync(&request, progress)?;
        Ok(())
    }
}
