//! Bounded retry with randomized exponential backoff.

use std::time::Duration;

use rand::Rng;

/// Attempt budget and wait bounds for one chat request.
///
/// The wait before retry `n` (1 after the first failure) is drawn uniformly
/// from `[min, clamp(multiplier * 2^(n-1), min, max)]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub min: Duration,
    pub max: Duration,
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(40))
    }
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, min: Duration, max: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min,
            max: max.max(min),
            multiplier: 1.0,
        }
    }

    /// Policy that retries without waiting; handy for stubs and tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    /// Upper bound of the wait that follows failed attempt `attempt`.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let exp = 2f64.powi(attempt.saturating_sub(1).min(62) as i32);
        let secs = (self.multiplier * exp)
            .min(self.max.as_secs_f64())
            .max(self.min.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Randomized wait that follows failed attempt `attempt`.
    pub fn delay<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let low = self.min.as_secs_f64();
        let high = self.ceiling(attempt).as_secs_f64();
        if high <= low {
            return self.min;
        }
        Duration::from_secs_f64(rng.gen_range(low..=high))
    }
}
