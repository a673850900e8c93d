use std::time::Duration;

use crate::config::Config;

/// Fixed-delay retry policy for uploads. Intentionally without backoff or
/// jitter: a wedding-day burst is better served by predictable, bounded
/// waits than by stretching delays out. See DESIGN.md for the trade-off.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        }
    }

    /// Policy that never sleeps, for tests and dry runs.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            retry_delay: Duration::ZERO,
        }
    }
}
