//! Courtesy delay between requests to the crawled site.

use std::time::{Duration, TryFromFloatSecsError};
use tracing::trace;

/// Sleeps for a fixed delay at each call to [`RequestPacer::pause`].
///
/// The traversal engine fetches sequentially, so a fixed pause after each
/// unit of work bounds the request rate against the origin site.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestPacer {
    delay: Duration,
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Negative and NaN delays clamp to zero; infinite or out of range
    /// delays are rejected.
    pub fn from_secs_f64(secs: f64) -> Result<Self, TryFromFloatSecsError> {
        Duration::try_from_secs_f64(secs.max(0.0)).map(Self::new)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn pause(&self) {
        if self.delay.is_zero() {
            return;
        }
        trace!("Pausing {:?}", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}
