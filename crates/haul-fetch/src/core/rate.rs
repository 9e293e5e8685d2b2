use std::time::{Duration, Instant};

const SMOOTHING: f64 = 0.3;
const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Exponentially smoothed transfer rate.
///
/// Bytes are accumulated between samples; a new rate is folded in at most
/// once per sample interval so bursty chunk delivery does not make the
/// estimate jump around.
#[derive(Debug, Clone)]
pub struct Throughput {
    window_start: Instant,
    window_bytes: u64,
    rate_bps: Option<f64>,
}

impl Throughput {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            window_bytes: 0,
            rate_bps: None,
        }
    }

    pub fn record(&mut self, bytes: u64, now: Instant) {
        self.window_bytes += bytes;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < SAMPLE_INTERVAL {
            return;
        }

        let sample = self.window_bytes as f64 / elapsed.as_secs_f64();
        self.rate_bps = Some(match self.rate_bps {
            Some(prev) => SMOOTHING * sample + (1.0 - SMOOTHING) * prev,
            None => sample,
        });
        self.window_start = now;
        self.window_bytes = 0;
    }

    pub fn rate_bps(&self) -> Option<f64> {
        self.rate_bps
    }
}
