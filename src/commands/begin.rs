//! `stagehand begin` - create the staging copy.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::ops::Beginner;

use super::{check_context, print_progress};

pub fn cmd_begin(config: &Config) -> Result<()> {
    let ctx = check_context(config);
    println!(
        "Mirroring {} into {}...",
        config.active_dir.display(),
        config.staging_dir.display()
    );

    Beginner::new(config.backend)
        .begin(&ctx, Some(&mut print_progress))
        .context("could not begin the staging process")?;

    println!("Staging copy created.");
    Ok(())
}
