use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use console::Color;
use haul_fetch::{DownloadError, DownloadResult, Payload, Progress, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

use crate::ui::console::{log_pair, log_pair_colored};

const PB_STYLE: &str = "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Captions and one progress bar per attempt, on stderr.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_bar(&self) {
        if let Some(pb) = self.bar().take() {
            pb.finish_and_clear();
        }
    }
}

fn new_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Some(style) = PB_TEMPLATE.as_ref() {
        pb.set_style(style.clone());
    }
    pb
}

impl ProgressSink for ConsoleSink {
    fn attempt_started(&self, uri: &str, attempt: u32, max_attempts: u32) {
        self.clear_bar();
        if attempt == 1 {
            log_pair("Downloading...", uri);
        } else {
            log_pair("Downloading...", &format!("{uri} (attempt {attempt}/{max_attempts})"));
        }
    }

    fn progress(&self, progress: &Progress) {
        let mut bar = self.bar();
        let pb = bar.get_or_insert_with(|| new_bar(progress.declared_length));
        pb.set_position(progress.bytes_received);
    }

    fn retrying(&self, attempt: u32, error: &DownloadError, delay: Duration) {
        self.clear_bar();
        log_pair_colored(
            "Retrying",
            &format!("attempt {attempt} failed ({error}), next in {}ms", delay.as_millis()),
            Some(Color::Yellow),
        );
    }

    fn finished(&self, result: &DownloadResult) {
        if let Some(pb) = self.bar().take() {
            if result.is_success() {
                pb.finish();
            } else {
                pb.abandon();
            }
        }
        match &result.outcome {
            Ok(Payload::File(path)) => log_pair("Saved", &path.display().to_string()),
            Ok(Payload::Text(_)) => {}
            Err(error) => log_pair_colored("Failed", &error.to_string(), Some(Color::Red)),
        }
    }
}
