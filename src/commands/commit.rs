//! `stagehand commit` - make staged changes live.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::ops::Committer;

use super::{check_context, print_progress};

pub fn cmd_commit(config: &Config) -> Result<()> {
    let ctx = check_context(config);
    println!(
        "Replaying {} onto {}...",
        config.staging_dir.display(),
        config.active_dir.display()
    );

    Committer::new(config.backend)
        .commit(&ctx, Some(&mut print_progress))
        .context("could not commit the staged changes")?;

    println!("Staged changes are live.");
    Ok(())
}
