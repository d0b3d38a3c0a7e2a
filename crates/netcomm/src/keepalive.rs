//! Fixed-period keep-alive timer.
//!
//! The server drops clients that go quiet, so a connected client sends a
//! keep-alive command on a fixed period. A beat that wakes up late is not
//! made up for: the next one is scheduled a full period after the late
//! one, since a burst of keep-alives tells the server nothing new.

use std::time::Duration;

use tokio::time::{self, Instant};

/// Smallest accepted period. A zero period would spin.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Yields one beat per period.
#[derive(Debug)]
pub(crate) struct KeepAlive {
    period: Duration,
    next_beat: Instant,
    beats: u64,
}

impl KeepAlive {
    /// The first beat fires one full period from now.
    pub(crate) fn new(period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        Self {
            period,
            next_beat: Instant::now() + period,
            beats: 0,
        }
    }

    /// Waits for the next beat and returns its number, starting at 1.
    pub(crate) async fn wait_for_beat(&mut self) -> u64 {
        time::sleep_until(self.next_beat).await;

        let now = Instant::now();
        let late_by = now.saturating_duration_since(self.next_beat);
        if late_by > self.period / 10 {
            tracing::debug!(
                beat = self.beats + 1,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "keep-alive late, skipping ahead"
            );
        }

        // Always schedule from now, not from the missed deadline.
        self.next_beat = now + self.period;
        self.beats += 1;
        self.beats
    }

    pub(crate) fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_beat_fires_once_per_period() {
        let start = Instant::now();
        let mut ka = KeepAlive::new(Duration::from_secs(5));

        assert_eq!(ka.wait_for_beat().await, 1);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(ka.wait_for_beat().await, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_beat_skips_missed_beats() {
        let start = Instant::now();
        let mut ka = KeepAlive::new(Duration::from_secs(1));

        // Nobody waited for three periods.
        time::advance(Duration::from_millis(3500)).await;
        assert_eq!(ka.wait_for_beat().await, 1);
        assert_eq!(ka.wait_for_beat().await, 2);
        assert_eq!(start.elapsed(), Duration::from_millis(4500));
    }

    #[tokio::test]
    async fn test_new_clamps_zero_period() {
        let ka = KeepAlive::new(Duration::ZERO);
        assert_eq!(ka.period(), MIN_PERIOD);
    }
}
