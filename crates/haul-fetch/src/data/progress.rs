use std::time::Duration;

/// Snapshot of one attempt's transfer, handed to a
/// [`ProgressSink`](crate::ProgressSink).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// 1-based index of the attempt that produced this snapshot.
    pub attempt: u32,

    /// Bytes received so far in this attempt.
    pub bytes_received: u64,

    /// Value of the `content-length` header, 0 when unknown.
    pub declared_length: u64,

    /// Smoothed throughput in bytes per second, if a rate has been sampled.
    pub rate_bps: Option<f64>,
}

impl Progress {
    pub fn new(attempt: u32, declared_length: u64) -> Self {
        Self {
            attempt,
            bytes_received: 0,
            declared_length,
            rate_bps: None,
        }
    }

    /// Completion percentage. Undefined while the length is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        if self.declared_length == 0 {
            return None;
        }
        Some((self.bytes_received as f64 / self.declared_length as f64) * 100.0)
    }

    /// Time left at the current smoothed rate.
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        if self.declared_length == 0 {
            return None;
        }
        let rate = self.rate_bps.filter(|r| *r > 0.0)?;
        let remaining = self.declared_length.saturating_sub(self.bytes_received);
        Some(Duration::from_secs_f64(remaining as f64 / rate))
    }

    #[must_use]
    pub fn is_length_known(&self) -> bool {
        self.declared_length > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_unknown_length() {
        let progress = Progress {
            bytes_received: 512,
            ..Progress::new(1, 0)
        };
        assert_eq!(progress.percentage(), None);
        assert!(!progress.is_length_known());
    }

    #[test]
    fn test_percentage() {
        let progress = Progress {
            bytes_received: 250,
            ..Progress::new(2, 1000)
        };
        assert_eq!(progress.percentage(), Some(25.0));
    }

    #[test]
    fn test_eta_needs_rate() {
        let mut progress = Progress {
            bytes_received: 500,
            ..Progress::new(1, 1000)
        };
        assert_eq!(progress.eta(), None);

        progress.rate_bps = Some(100.0);
        assert_eq!(progress.eta(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_eta_saturates_when_overshooting() {
        let progress = Progress {
            bytes_received: 2000,
            rate_bps: Some(10.0),
            ..Progress::new(1, 1000)
        };
        assert_eq!(progress.eta(), Some(Duration::ZERO));
    }
}
