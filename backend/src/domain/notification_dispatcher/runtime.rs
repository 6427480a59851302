//! Default sleeping and jitter for the dispatcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{BackoffJitter, DispatchSleeper};

/// Runtime helpers used between polls and for retry scheduling.
pub struct DispatcherRuntime {
    pub sleeper: Arc<dyn DispatchSleeper>,
    pub jitter: Arc<dyn BackoffJitter>,
}

impl Default for DispatcherRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(AttemptJitter),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl DispatchSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Adds up to a quarter of the base delay, seeded from the clock and the
/// attempt number.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttemptJitter;

impl BackoffJitter for AttemptJitter {
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let max_extra = (base_ms / 4).max(1);
        let seed = u64::from(now.timestamp_subsec_nanos()) ^ u64::from(attempt);
        Duration::from_millis(base_ms.saturating_add(seed % max_extra.saturating_add(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(500, 1)]
    #[case(4_000, 4)]
    #[case(60_000, 10)]
    fn jitter_stays_within_a_quarter_of_base(#[case] base_ms: u64, #[case] attempt: u32) {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
            .single()
            .expect("valid time")
            + chrono::TimeDelta::nanoseconds(123_456_789);
        let delay = AttemptJitter.jittered_delay(Duration::from_millis(base_ms), attempt, now);
        assert!(delay >= Duration::from_millis(base_ms));
        assert!(delay <= Duration::from_millis(base_ms + base_ms / 4));
    }
}
