//! `stagehand preflight` - evaluate an operation's preconditions.

use anyhow::{bail, Result};
use clap::ValueEnum;

use crate::config::Config;
use crate::precondition::host_tools::rsync_is_available;
use crate::precondition::tree::{
    beginner_preconditions, cleaner_preconditions, committer_preconditions,
    stager_preconditions, PreconditionTree,
};
use crate::report::{CheckResult, PreflightReport};
use crate::sync::Backend;

use super::check_context;

/// Which operation's tree to evaluate.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Operation {
    Begin,
    Stage,
    Commit,
    Clean,
}

impl Operation {
    fn tree(self) -> PreconditionTree {
        match self {
            Operation::Begin => beginner_preconditions(),
            Operation::Stage => stager_preconditions(),
            Operation::Commit => committer_preconditions(),
            Operation::Clean => cleaner_preconditions(),
        }
    }
}

pub fn cmd_preflight(config: &Config, operation: Operation, strict: bool) -> Result<()> {
    let ctx = check_context(config);
    let tree = operation.tree();
    let mut report = PreflightReport::evaluate(&tree, &ctx);
    // The external tool is only a requirement when it is the active backend.
    if config.backend == Backend::Rsync {
        report
            .checks
            .push(CheckResult::evaluate(&rsync_is_available(), &ctx));
    }
    report.print();

    if strict && !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above first.",
            report.fail_count()
        );
    }
    Ok(())
}
