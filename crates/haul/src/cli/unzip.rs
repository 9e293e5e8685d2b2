use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use haul_archive::{EntryStatus, Unzipper};

use crate::ui::console::{log_pair, log_pair_above};

#[derive(Args, Clone, Debug)]
pub struct UnzipArgs {
    /// Zip archive to extract.
    pub archive: PathBuf,

    /// Output directory, created when missing.
    pub dir: PathBuf,

    #[arg(short, long)]
    pub silent: bool,
}

pub async fn unzip(args: UnzipArgs) -> Result<()> {
    extract(args.archive, args.dir, args.silent).await
}

pub async fn extract(archive: PathBuf, dir: PathBuf, silent: bool) -> Result<()> {
    if !silent {
        // progress lines overwrite this one
        eprintln!();
    }

    let report = tokio::task::spawn_blocking(move || {
        Unzipper::new()
            .on_entry(move |entry| {
                if silent {
                    return;
                }
                match &entry.status {
                    EntryStatus::Extracted { .. } => log_pair_above("Unzipping", &entry.name),
                    EntryStatus::Failed { reason } => {
                        log_pair("Failed", &format!("{}: {reason}", entry.name))
                    }
                }
            })
            .extract(&archive, &dir)
    })
    .await
    .context("extraction task failed")??;

    if !silent {
        log_pair_above("Unzipping", "Done");
    }

    let failed = report.failures().count();
    if failed > 0 {
        bail!(
            "{failed} of {} entries could not be extracted into {}",
            report.entries.len(),
            report.output_dir.display()
        );
    }
    Ok(())
}
