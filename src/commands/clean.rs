//! `stagehand clean` - discard the staging copy.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::ops::Cleaner;

use super::check_context;

pub fn cmd_clean(config: &Config) -> Result<()> {
    let ctx = check_context(config);
    println!("Removing {}...", config.staging_dir.display());

    Cleaner::new()
        .clean(&ctx)
        .context("could not remove the staging directory")?;

    println!("Clean complete.");
    Ok(())
}
