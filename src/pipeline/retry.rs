//! Bounded retry policy
//!
//! Replaces ad-hoc sleep loops with an explicit object injected into the
//! enricher and expander, so tests can substitute a zero-backoff policy.

use std::time::Duration;

/// A fixed budget of attempts with a fixed backoff between them.
///
/// No exponential growth: at catalog scale a constant pause between
/// attempts is enough, and it keeps test timing predictable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Sleeps for one backoff interval.
    pub async fn wait(&self) {
        tokio::time::sleep(self.backoff).await;
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}
