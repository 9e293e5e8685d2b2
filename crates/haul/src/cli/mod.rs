pub mod app;
mod get;
mod home;
mod sweep;
mod unzip;

use anyhow::Result;

use crate::cli::app::{App, Commands};
use crate::config::Config;

/// A command that failed, and whether it was asked to stay quiet.
#[derive(Debug)]
pub struct Failure {
    pub error: anyhow::Error,
    pub silent: bool,
}

pub async fn run(app: App) -> Result<(), Failure> {
    let config = match Config::load(app.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            let silent = app.cmd.is_silent(&Config::default());
            return Err(Failure { error, silent });
        }
    };
    let silent = app.cmd.is_silent(&config);

    dispatch(app.cmd, &config)
        .await
        .map_err(|error| Failure { error, silent })
}

async fn dispatch(cmd: Commands, config: &Config) -> Result<()> {
    match cmd {
        Commands::Get(args) => get::get(args, config).await,
        Commands::Unzip(args) => unzip::unzip(args).await,
        Commands::Sweep(args) => sweep::sweep(args, config),
        Commands::Home(args) => home::home(args),
    }
}
