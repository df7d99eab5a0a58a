//! The `stage` operation: run a Composer command against the staging copy.

use tracing::debug;

use crate::error::{Error, Result};
use crate::precondition::tree::{stager_preconditions, PreconditionTree};
use crate::precondition::{CheckContext, Precondition};
use crate::process::{Cmd, CmdTimeout};

pub struct Stager {
    preconditions: PreconditionTree,
}

impl Stager {
    pub fn new() -> Self {
        Self {
            preconditions: stager_preconditions(),
        }
    }

    /// Run `composer <args> --working-dir=<staging>`, streaming output to
    /// `progress` as it arrives.
    pub fn stage(
        &self,
        composer_args: &[String],
        ctx: &CheckContext,
        progress: Option<&mut dyn FnMut(&str)>,
    ) -> Result<()> {
        validate_command(composer_args)?;
        self.preconditions.assert_fulfilled(ctx)?;

        let working_dir = format!("--working-dir={}", ctx.staging.display());
        debug!(?composer_args, %working_dir, "staging composer command");

        let mut cmd = Cmd::new("composer")
            .args(composer_args)
            .arg(&working_dir)
            .error_msg("composer command failed");
        if let Some(limit) = ctx.timeout {
            cmd = cmd.timeout(limit);
        }

        let mut sink = |_: &str| {};
        let on_output: &mut dyn FnMut(&str) = match progress {
            Some(callback) => callback,
            None => &mut sink,
        };

        match cmd.run_streaming(on_output) {
            Ok(_) => Ok(()),
            Err(err) => {
                if let Some(timeout) = err.downcast_ref::<CmdTimeout>() {
                    return Err(Error::Timeout {
                        limit: timeout.limit,
                    });
                }
                Err(Error::Command {
                    detail: format!("{err:#}"),
                })
            }
        }
    }
}

impl Default for Stager {
    fn default() -> Self {
        Self::new()
    }
}

/// The command is the argument vector *after* the `composer` executable:
/// it must be non-empty, must not name the executable again, and must not
/// carry `--working-dir` (the staging directory always wins).
fn validate_command(composer_args: &[String]) -> Result<()> {
    if composer_args.is_empty() {
        return Err(Error::InvalidCommand(
            "the command cannot be empty".to_string(),
        ));
    }
    if composer_args[0] == "composer" {
        return Err(Error::InvalidCommand(
            "the command cannot begin with 'composer' - it is implied".to_string(),
        ));
    }
    if composer_args
        .iter()
        .any(|arg| arg == "--working-dir" || arg.starts_with("--working-dir="))
    {
        return Err(Error::InvalidCommand(
            "the command cannot contain the '--working-dir' option - the staging directory is used".to_string(),
        ));
    }
    Ok(())
}
