use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use haul_fetch::{DownloadRequest, Downloader, Payload};

use crate::cli::unzip::extract;
use crate::config::{Config, DownloadConfig};
use crate::ui::tracker::ConsoleSink;

#[derive(Args, Clone, Debug)]
pub struct GetArgs {
    /// http:// or https:// address of the artifact.
    pub url: String,

    /// Save to this path. Without it the body is printed to stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Total number of attempts.
    #[arg(long, value_name = "N")]
    pub attempts: Option<u32>,

    /// Give up on an attempt after this many milliseconds without data.
    #[arg(long, value_name = "MS")]
    pub stall_timeout: Option<u64>,

    /// Pause between attempts, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub retry_delay: Option<u64>,

    /// No captions or progress bars.
    #[arg(short, long)]
    pub silent: bool,

    /// Do not validate TLS certificates.
    #[arg(long)]
    pub insecure: bool,

    /// Directory for the partial file.
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Extract the downloaded zip into this directory.
    #[arg(long, value_name = "DIR", requires = "output")]
    pub unzip: Option<PathBuf>,
}

impl GetArgs {
    fn overrides(&self) -> DownloadConfig {
        DownloadConfig {
            max_attempts: self.attempts,
            stall_timeout_ms: self.stall_timeout,
            retry_delay_ms: self.retry_delay,
            silent: self.silent.then_some(true),
            accept_invalid_certs: self.insecure.then_some(true),
            temp_dir: self.temp_dir.clone(),
            user_agent: None,
        }
    }
}

pub async fn get(args: GetArgs, config: &Config) -> Result<()> {
    let settings = config.download.clone().merge(args.overrides());
    let options = settings.retry_options();
    let silent = options.silent;

    let client = settings
        .client_settings()
        .build()
        .context("failed to build HTTP client")?;
    let downloader = Downloader::new(client).with_sink(Arc::new(ConsoleSink::new()));

    let mut request = DownloadRequest::new(&args.url)
        .options(options)
        .temp_dir(settings.temp_dir());
    request.destination = args.output.clone();

    let result = downloader.start(request).end().await;
    let attempts = result.attempts;
    let payload = result
        .into_outcome()
        .with_context(|| format!("failed to download {} after {attempts} attempt(s)", args.url))?;

    match payload {
        Payload::Text(text) => print!("{text}"),
        Payload::File(path) => {
            if let Some(dir) = args.unzip {
                extract(path, dir, silent).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GetArgs {
        GetArgs {
            url: "https://example.test/f.zip".into(),
            output: None,
            attempts: None,
            stall_timeout: None,
            retry_delay: None,
            silent: false,
            insecure: false,
            temp_dir: None,
            unzip: None,
        }
    }

    #[test]
    fn test_unset_flags_do_not_override() {
        let overrides = args().overrides();
        assert_eq!(overrides, DownloadConfig::default());
    }

    #[test]
    fn test_flags_become_overrides() {
        let overrides = GetArgs {
            attempts: Some(7),
            silent: true,
            insecure: true,
            ..args()
        }
        .overrides();

        assert_eq!(overrides.max_attempts, Some(7));
        assert_eq!(overrides.silent, Some(true));
        assert_eq!(overrides.accept_invalid_certs, Some(true));
    }
}
