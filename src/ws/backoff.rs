//! Reconnection backoff — exponential delay with bounded random jitter.

use crate::ws::WsConfig;
use std::time::Duration;

/// Cap on the doubling exponent so the shift cannot overflow.
const MAX_EXPONENT: u32 = 10;

/// Exponential backoff policy for reconnect scheduling.
///
/// The delay before attempt `n + 1` (zero-based, after `n` consecutive
/// failures) is `min(cap, base * 2^n) + jitter`, `jitter ∈ [0, jitter_max)`.
/// The attempt counter resets only on a successful open.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    jitter_max: Duration,
    attempts: u32,
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration, jitter_max: Duration) -> Self {
        Self {
            base,
            cap,
            jitter_max,
            attempts: 0,
        }
    }

    pub fn from_config(config: &WsConfig) -> Self {
        Self::new(
            Duration::from_millis(u64::from(config.base_reconnect_delay_ms)),
            Duration::from_millis(u64::from(config.max_reconnect_delay_ms)),
            Duration::from_millis(u64::from(config.jitter_max_ms)),
        )
    }

    /// Next delay, consuming one attempt. `unit` must be in `[0, 1)` and
    /// scales the jitter band — transports pass their platform RNG here.
    pub fn next_delay_with(&mut self, unit: f64) -> Duration {
        let exp = self.attempts.min(MAX_EXPONENT);
        self.attempts = self.attempts.saturating_add(1);

        let base_ms = (self.base.as_millis() as u64)
            .saturating_mul(1u64 << exp)
            .min(self.cap.as_millis() as u64);
        let jitter_ms = (unit.clamp(0.0, 1.0) * self.jitter_max.as_millis() as f64) as u64;

        Duration::from_millis(base_ms + jitter_ms)
    }

    /// Next delay with jitter from the thread RNG.
    pub fn next_delay(&mut self) -> Duration {
        self.next_delay_with(rand::random::<f64>())
    }

    /// Reset after a successful open.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Consecutive failures so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
