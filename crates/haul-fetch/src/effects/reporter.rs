use std::time::Instant;

use crate::core::Throughput;
use crate::data::Progress;
use crate::effects::sink::ProgressSink;

/// Per-attempt progress accounting.
///
/// Always counts received bytes. Rate sampling and sink notifications only
/// happen when output is wanted and the declared length is known.
pub(crate) struct ProgressReporter<'a> {
    sink: &'a dyn ProgressSink,
    active: bool,
    progress: Progress,
    throughput: Throughput,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(
        sink: &'a dyn ProgressSink,
        attempt: u32,
        declared_length: u64,
        silent: bool,
    ) -> Self {
        let progress = Progress::new(attempt, declared_length);
        Self {
            sink,
            active: !silent && progress.is_length_known(),
            progress,
            throughput: Throughput::new(Instant::now()),
        }
    }

    pub(crate) fn advance(&mut self, bytes: u64) {
        self.progress.bytes_received += bytes;
        if !self.active {
            return;
        }
        self.throughput.record(bytes, Instant::now());
        self.progress.rate_bps = self.throughput.rate_bps();
        self.sink.progress(&self.progress);
    }

    pub(crate) fn bytes_received(&self) -> u64 {
        self.progress.bytes_received
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Progress>>);

    impl ProgressSink for Recorder {
        fn progress(&self, progress: &Progress) {
            self.0.lock().unwrap().push(*progress);
        }
    }

    #[test]
    fn test_reports_when_length_known() {
        let sink = Recorder::default();
        let mut reporter = ProgressReporter::new(&sink, 1, 10, false);
        assert!(reporter.is_active());

        reporter.advance(4);
        reporter.advance(6);

        let seen = sink.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].bytes_received, 10);
        assert_eq!(seen[1].percentage(), Some(100.0));
    }

    #[test]
    fn test_inert_when_length_unknown() {
        let sink = Recorder::default();
        let mut reporter = ProgressReporter::new(&sink, 1, 0, false);
        assert!(!reporter.is_active());

        reporter.advance(100);
        assert_eq!(reporter.bytes_received(), 100);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_inert_when_silent() {
        let sink = Recorder::default();
        let mut reporter = ProgressReporter::new(&sink, 1, 100, true);
        reporter.advance(50);
        assert_eq!(reporter.bytes_received(), 50);
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
