// ABOUTME: HTTP health verification with bounded retries.
// ABOUTME: Each attempt is cut off by its own timeout; the first 2xx ends the check.

use reqwest::Client;
use std::time::{Duration, Instant};

use crate::config::HealthCheckConfig;
use crate::error::Result;

/// Probe attempts made before giving up.
pub const MAX_ATTEMPTS: u32 = 5;

/// Fallback error when the loop ends without a recorded failure.
pub const MAX_RETRIES_EXCEEDED: &str = "Max retries exceeded";

const USER_AGENT: &str = concat!("keel-health-checker/", env!("CARGO_PKG_VERSION"));

/// Result of a health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthVerdict {
    pub healthy: bool,
    pub error: Option<String>,
    /// Round-trip time of the deciding attempt.
    pub latency: Option<Duration>,
    pub status_code: Option<u16>,
    pub attempts: u32,
}

impl HealthVerdict {
    fn skipped() -> Self {
        Self {
            healthy: true,
            error: None,
            latency: None,
            status_code: None,
            attempts: 0,
        }
    }
}

/// Polls the configured URL until it answers with a success status.
pub struct HealthVerifier {
    config: Option<HealthCheckConfig>,
    client: Client,
}

enum Probe {
    Healthy { status: u16, latency: Duration },
    Unhealthy { status: u16, reason: String, latency: Duration },
    Unreachable { error: String, latency: Duration },
}

impl HealthVerifier {
    /// `None` turns the verifier into a no-op that always reports healthy.
    pub fn new(config: Option<HealthCheckConfig>) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { config, client })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    pub async fn check(&self) -> HealthVerdict {
        let Some(config) = &self.config else {
            tracing::debug!("No health check URL configured, skipping");
            return HealthVerdict::skipped();
        };

        let mut verdict = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let last = attempt == MAX_ATTEMPTS;

            match self.probe(config).await {
                Probe::Healthy { status, latency } => {
                    tracing::info!(
                        "Health check passed on attempt {} with HTTP {} in {:?}",
                        attempt,
                        status,
                        latency
                    );
                    return HealthVerdict {
                        healthy: true,
                        error: None,
                        latency: Some(latency),
                        status_code: Some(status),
                        attempts: attempt,
                    };
                }
                Probe::Unhealthy {
                    status,
                    reason,
                    latency,
                } => {
                    let error = format!("HTTP {}: {}", status, reason);
                    tracing::debug!("Health check attempt {} failed: {}", attempt, error);
                    if last {
                        verdict = Some(HealthVerdict {
                            healthy: false,
                            error: Some(error),
                            latency: Some(latency),
                            status_code: Some(status),
                            attempts: attempt,
                        });
                    }
                }
                Probe::Unreachable { error, latency } => {
                    tracing::debug!("Health check attempt {} failed: {}", attempt, error);
                    if last {
                        verdict = Some(HealthVerdict {
                            healthy: false,
                            error: Some(error),
                            latency: Some(latency),
                            status_code: None,
                            attempts: attempt,
                        });
                    }
                }
            }

            if !last && !config.retry_delay.is_zero() {
                tracing::info!(
                    "Health check attempt {} failed, retrying in {:?}",
                    attempt,
                    config.retry_delay
                );
                tokio::time::sleep(config.retry_delay).await;
            }
        }

        verdict.unwrap_or(HealthVerdict {
            healthy: false,
            error: Some(MAX_RETRIES_EXCEEDED.to_string()),
            latency: None,
            status_code: None,
            attempts: MAX_ATTEMPTS,
        })
    }

    /// One GET. The request future is dropped when the timeout elapses.
    async fn probe(&self, config: &HealthCheckConfig) -> Probe {
        let start = Instant::now();
        let request = self.client.get(config.url.clone()).send();

        match tokio::time::timeout(config.timeout, request).await {
            Ok(Ok(response)) => {
                let status = response.status();
                let latency = start.elapsed();
                if status.is_success() {
                    Probe::Healthy {
                        status: status.as_u16(),
                        latency,
                    }
                } else {
                    Probe::Unhealthy {
                        status: status.as_u16(),
                        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                        latency,
                    }
                }
            }
            Ok(Err(e)) => Probe::Unreachable {
                error: e.to_string(),
                latency: start.elapsed(),
            },
            Err(_) => Probe::Unreachable {
                error: format!("Health check timed out after {:?}", config.timeout),
                latency: start.elapsed(),
            },
        }
    }
}
