//! Passive throughput accumulator: sums bytes per tumbling wall-clock window
//! and logs each closed window in kilobytes.

use std::time::Duration;

use tokio::time::Instant;

/// One closed throughput window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputSample {
    pub bytes: u64,
    pub window: Duration,
}

impl ThroughputSample {
    pub fn kilobytes(&self) -> u64 {
        self.bytes / 1024
    }
}

pub struct ThroughputMeter {
    window: Duration,
    window_start: Instant,
    bytes: u64,
}

impl ThroughputMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.max(Duration::from_millis(1)),
            window_start: Instant::now(),
            bytes: 0,
        }
    }

    /// Add `bytes` to the current window. Returns the previous window's total
    /// when this call crossed a window boundary.
    pub fn record(&mut self, bytes: usize) -> Option<ThroughputSample> {
        let closed = self.roll(Instant::now());
        self.bytes += bytes as u64;
        closed
    }

    fn roll(&mut self, now: Instant) -> Option<ThroughputSample> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let sample = ThroughputSample {
            bytes: self.bytes,
            window: self.window,
        };
        let windows_passed = (elapsed.as_nanos() / self.window.as_nanos()) as u32;
        self.window_start += self.window * windows_passed;
        self.bytes = 0;

        tracing::info!(
            "[fh-01] {} kb read in the last {}s",
            sample.kilobytes(),
            self.window.as_secs()
        );
        Some(sample)
    }
}
