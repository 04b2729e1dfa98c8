use std::sync::Arc;
use std::time::Duration;

use expander_core::pacing_delay;
use rand::Rng;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Draws the randomized delay placed in front of every request. The first
/// request of the process and the one right after a cooldown go out at once.
#[derive(Debug, Clone)]
pub struct Pacer {
    min: Duration,
    max: Duration,
    rested: bool,
}

impl Pacer {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            rested: true,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        if std::mem::replace(&mut self.rested, false) {
            return Duration::ZERO;
        }
        pacing_delay(self.min, self.max, rand::rng().random::<f64>())
    }

    /// The next request follows a long pause and needs no extra delay.
    pub fn rest(&mut self) {
        self.rested = true;
    }
}

/// Operator request to cut the current cooldown short.
#[derive(Debug, Clone, Default)]
pub struct RetrySignal {
    notify: Arc<Notify>,
}

impl RetrySignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wakes a cooldown that is currently waiting. Requests made while no
    /// cooldown is running are dropped.
    pub fn request(&self) {
        self.notify.notify_waiters();
    }

    async fn requested(&self) {
        self.notify.notified().await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    Elapsed,
    RetryRequested,
    Interrupted,
}

/// Sleeps for `delay` unless the session is interrupted first.
pub async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> Wait {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Wait::Interrupted,
        _ = tokio::time::sleep(delay) => Wait::Elapsed,
    }
}

/// Rate-limit cooldown: ends on timeout, operator retry, or interruption.
pub async fn cooldown(delay: Duration, cancel: &CancellationToken, retry: &RetrySignal) -> Wait {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Wait::Interrupted,
        _ = retry.requested() => Wait::RetryRequested,
        _ = tokio::time::sleep(delay) => Wait::Elapsed,
    }
}
