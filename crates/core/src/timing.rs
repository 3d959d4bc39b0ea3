//! Randomized pauses.

use std::time::Duration;
use tracing::debug;

use crate::config::DelayRange;

/// Sleep for a duration drawn from `range`.
pub async fn pause(range: DelayRange, reason: &str) -> Duration {
    let wait = range.sample();
    debug!(secs = wait.as_secs(), reason, "Waiting");
    tokio::time::sleep(wait).await;
    wait
}

/// Sleep for a fixed duration.
pub async fn pause_for(wait: Duration, reason: &str) {
    debug!(secs = wait.as_secs(), reason, "Waiting");
    tokio::time::sleep(wait).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_pause_advances_virtual_clock() {
        let start = tokio::time::Instant::now();
        let waited = pause(DelayRange::new(10, 15), "test").await;
        let elapsed = start.elapsed();

        assert!(elapsed >= waited);
        assert!((10..=15).contains(&waited.as_secs()));
    }
}
