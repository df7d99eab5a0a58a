//! `stagehand stage` - run a Composer command in the staging copy.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::ops::Stager;

use super::{check_context, print_progress};

pub fn cmd_stage(config: &Config, composer_args: &[String]) -> Result<()> {
    let ctx = check_context(config);
    println!(
        "Running 'composer {}' in {}...",
        composer_args.join(" "),
        config.staging_dir.display()
    );

    Stager::new()
        .stage(composer_args, &ctx, Some(&mut print_progress))
        .context("could not stage the composer command")?;

    println!("Composer command staged.");
    Ok(())
}
