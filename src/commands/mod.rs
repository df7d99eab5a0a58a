//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `begin` - mirror the active directory into a new staging copy
//! - `stage` - run a Composer command against the staging copy
//! - `commit` - replay the staged copy onto the active directory
//! - `clean` - remove the staging directory
//! - `preflight` - evaluate an operation's preconditions and report
//! - `show` - display information

pub mod begin;
pub mod clean;
pub mod commit;
pub mod preflight;
pub mod show;
pub mod stage;

pub use begin::cmd_begin;
pub use clean::cmd_clean;
pub use commit::cmd_commit;
pub use preflight::{cmd_preflight, Operation};
pub use show::cmd_show;
pub use stage::cmd_stage;

use crate::config::Config;
use crate::host::NativeHost;
use crate::precondition::CheckContext;

static HOST: NativeHost = NativeHost;

/// Build an evaluation context from loaded configuration.
pub(crate) fn check_context(config: &Config) -> CheckContext<'_> {
    CheckContext {
        active: &config.active_dir,
        staging: &config.staging_dir,
        exclusions: &config.exclusions,
        timeout: config.timeout,
        host: &HOST,
        backend: config.backend,
    }
}

/// Stream subprocess/sync output straight to the terminal.
pub(crate) fn print_progress(line: &str) {
    println!("  {line}");
}
