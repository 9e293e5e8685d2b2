use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep, sleep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogState {
    Idle,
    Running,
    Fired,
    Stopped,
}

/// Attempt-scoped stall detector.
///
/// Backed by one deadline timer that every [`reset`](Self::reset) pushes
/// forward, so it only fires after a continuous idle gap of at least the
/// configured timeout. Without a timeout the watchdog never fires.
#[derive(Debug)]
pub struct Watchdog {
    timeout: Option<Duration>,
    timer: Option<Pin<Box<Sleep>>>,
    state: WatchdogState,
}

impl Watchdog {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            timer: None,
            state: WatchdogState::Idle,
        }
    }

    pub fn state(&self) -> WatchdogState {
        self.state
    }

    /// Arm the timer. Has no effect unless the watchdog is idle.
    pub fn start(&mut self) {
        if self.state != WatchdogState::Idle {
            return;
        }
        self.timer = self.timeout.map(|timeout| Box::pin(sleep(timeout)));
        self.state = WatchdogState::Running;
    }

    /// Record activity, pushing the deadline a full timeout into the future.
    pub fn reset(&mut self) {
        if self.state != WatchdogState::Running {
            return;
        }
        if let (Some(timer), Some(timeout)) = (self.timer.as_mut(), self.timeout) {
            timer.as_mut().reset(Instant::now() + timeout);
        }
    }

    /// Disarm. Idempotent, and a fired watchdog stays fired.
    pub fn stop(&mut self) {
        if matches!(self.state, WatchdogState::Idle | WatchdogState::Running) {
            self.state = WatchdogState::Stopped;
        }
        self.timer = None;
    }

    /// Completes when the deadline passes. Pending forever when the
    /// watchdog is not running or has no timeout.
    pub async fn expired(&mut self) {
        match (self.state, self.timer.as_mut()) {
            (WatchdogState::Running, Some(timer)) => timer.as_mut().await,
            _ => pending().await,
        }
    }

    /// Transition to `Fired` and return the idle gap that caused it.
    pub fn fire(&mut self) -> Duration {
        self.state = WatchdogState::Fired;
        self.timer = None;
        tracing::debug!(timeout = ?self.timeout, "inactivity watchdog fired");
        self.timeout.unwrap_or_default()
    }
}
