//! Per-turn streaming metrics.

use std::time::Duration;

/// Smallest elapsed time used for the rate estimate, so the first token
/// never divides by zero.
const MIN_ELAPSED: Duration = Duration::from_millis(1);

/// Token count, time-to-first-token and running tokens-per-second of the
/// current turn.
///
/// The caller measures elapsed time from the moment the query was sent; this
/// type only does the bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamMetrics {
    token_count: u64,
    time_to_first_token: Option<Duration>,
    tokens_per_second: f64,
}

impl StreamMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one token received `elapsed` after the query was sent.
    ///
    /// Returns `true` when this was the first token of the turn.
    pub fn record_token(&mut self, elapsed: Duration) -> bool {
        self.token_count += 1;
        let first = self.token_count == 1;
        if first {
            self.time_to_first_token = Some(elapsed);
        }
        let seconds = elapsed.max(MIN_ELAPSED).as_secs_f64();
        self.tokens_per_second = self.token_count as f64 / seconds;
        first
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn token_count(&self) -> u64 {
        self.token_count
    }

    pub fn time_to_first_token(&self) -> Option<Duration> {
        self.time_to_first_token
    }

    /// TTFT in seconds, `0.0` until the first token arrives.
    pub fn time_to_first_token_seconds(&self) -> f64 {
        self.time_to_first_token
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn tokens_per_second(&self) -> f64 {
        self.tokens_per_second
    }
}
