// ABOUTME: HTTP health check configuration.
// ABOUTME: Per-attempt timeout bounds and the fixed delay between attempts.

use std::time::Duration;
use url::Url;

pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 300;
pub const MIN_HEALTH_TIMEOUT_SECS: u64 = 30;
pub const MAX_HEALTH_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckConfig {
    pub url: Url,
    /// Upper bound on a single probe.
    pub timeout: Duration,
    /// Wait between a failed probe and the next one.
    pub retry_delay: Duration,
}

impl HealthCheckConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Whether `secs` is an accepted health check timeout (inclusive bounds).
pub fn timeout_in_range(secs: u64) -> bool {
    (MIN_HEALTH_TIMEOUT_SECS..=MAX_HEALTH_TIMEOUT_SECS).contains(&secs)
}
