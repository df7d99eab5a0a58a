//! The `commit` operation: make staged changes live.

use crate::error::Result;
use crate::precondition::tree::{committer_preconditions, PreconditionTree};
use crate::precondition::{CheckContext, Precondition};
use crate::sync::{syncer_for, Backend, FileSyncer, SyncRequest};

pub struct Committer {
    preconditions: PreconditionTree,
    syncer: Box<dyn FileSyncer>,
}

impl Committer {
    pub fn new(backend: Backend) -> Self {
        Self {
            preconditions: committer_preconditions(),
            syncer: syncer_for(backend),
        }
    }

    /// Replay the staged copy onto the active directory.
    pub fn commit(
        &self,
        ctx: &CheckContext,
        progress: Option<&mut dyn FnMut(&str)>,
    ) -> Result<()> {
        self.preconditions.assert_fulfilled(ctx)?;
        let request = SyncRequest {
            source: ctx.staging,
            destination: ctx.active,
            exclusions: ctx.exclusions,
            timeout: ctx.timeout,
        };
        self.syncer.sync(&request, progress)?;
        Ok(())
    }
}
