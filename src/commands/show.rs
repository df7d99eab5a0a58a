//! `stagehand show` - display information.

use anyhow::Result;

use crate::config::Config;

pub fn cmd_show(config: &Config) -> Result<()> {
    config.print();
    Ok(())
}
