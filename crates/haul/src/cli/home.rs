use anyhow::{Context, Result};
use clap::Args;

#[derive(Args, Clone, Debug)]
pub struct HomeArgs {
    /// Application name; the directory is ~/.<APP>.
    pub app: String,
}

pub fn home(args: HomeArgs) -> Result<()> {
    let dir = haul_platform::app_home(&args.app)
        .with_context(|| format!("cannot prepare home directory for '{}'", args.app))?;
    println!("{}", dir.display());
    Ok(())
}
