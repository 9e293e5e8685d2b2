use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::Config;
use crate::ui::console::log_pair;

#[derive(Args, Clone, Debug)]
pub struct SweepArgs {
    /// Directory to clean. Defaults to the configured temp directory.
    pub dir: Option<PathBuf>,
}

pub fn sweep(args: SweepArgs, config: &Config) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| config.download.temp_dir());
    let removed = haul_fs::sweep_dir(&dir)
        .with_context(|| format!("failed to sweep {}", dir.display()))?;
    log_pair("Removed", &format!("{removed} partial download(s)"));
    Ok(())
}
