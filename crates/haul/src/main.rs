use std::process::ExitCode;

use clap::Parser;
use haul_fetch::ShutdownHook;
use tracing_subscriber::EnvFilter;

use crate::cli::app::App;

mod cli;
mod config;
mod ui;

const LOG_ENV: &str = "HAUL_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let app = App::parse();
    init_tracing(app.verbose);

    // partial downloads are swept on exit and on termination signals
    let _hook = ShutdownHook::install();

    match cli::run(app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            if !failure.silent {
                ui::console::log_error(&failure.error);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
