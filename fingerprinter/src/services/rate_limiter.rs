//! Request pacing for rate-limited upstreams
//!
//! MusicBrainz allows one request per second per client. The pacer enforces a
//! minimum interval between consecutive requests: the first call returns
//! immediately, every later call sleeps for whatever remains of the interval.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// MusicBrainz rate limit (1 request per second)
pub const MUSICBRAINZ_INTERVAL: Duration = Duration::from_millis(1000);

/// Minimum-interval pacer
pub struct RequestPacer {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait if necessary to comply with the interval, then mark a request
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::new(MUSICBRAINZ_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval() {
        let pacer = RequestPacer::default();
        assert_eq!(pacer.min_interval(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_not_delayed() {
        let pacer = RequestPacer::new(Duration::from_millis(500));
        let start = Instant::now();

        pacer.wait().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_timing() {
        let pacer = RequestPacer::new(Duration::from_millis(500));
        let start = Instant::now();

        pacer.wait().await;
        pacer.wait().await;
        let second_elapsed = start.elapsed();
        pacer.wait().await;
        let third_elapsed = start.elapsed();

        assert!(second_elapsed >= Duration::from_millis(500));
        assert!(third_elapsed >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_passed() {
        let pacer = RequestPacer::new(Duration::from_millis(500));

        pacer.wait().await;
        tokio::time::sleep(Duration::from_millis(700)).await;

        let before = Instant::now();
        pacer.wait().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
