//! Request dispatch with per-attempt timeouts and linear retry backoff.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, RetryConfig};
use crate::findings::AnalysisReport;
use crate::input::AnalysisRequest;
use crate::normalize::normalize;
use crate::provider::{AnalysisProvider, ProviderError, ProviderResponse};

/// Failure of a whole dispatch, after retries.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("analysis failed after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: ProviderError,
    },
    #[error("analysis rejected by provider: {0}")]
    Rejected(#[source] ProviderError),
}

impl RequestError {
    /// Number of provider calls made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RequestError::Exhausted { attempts, .. } => *attempts,
            RequestError::Rejected(_) => 1,
        }
    }
}

/// How many times to call the provider and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait before the attempt following `attempt` (1-based): base * attempt.
    /// Saturates at `Duration::MAX`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.checked_mul(attempt).unwrap_or(Duration::MAX)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.retry_delay_ms))
    }
}

/// Sends requests to a provider and normalizes the answer.
pub struct Dispatcher {
    provider: Arc<dyn AnalysisProvider>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn AnalysisProvider>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            provider,
            timeout,
            retry,
        }
    }

    /// Create a dispatcher using the config's timeout and retry settings.
    pub fn from_config(provider: Arc<dyn AnalysisProvider>, config: &Config) -> Self {
        Self::new(provider, config.timeout(), RetryPolicy::from(&config.retry))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run the request and normalize the provider's answer.
    pub async fn dispatch(&self, request: &AnalysisRequest) -> Result<AnalysisReport, RequestError> {
        let response = self.fetch(request).await?;
        let report = normalize(&response);
        info!(
            provider = self.provider.name(),
            findings = report.total_findings(),
            grade = %report.quality_score,
            "analysis complete"
        );
        Ok(report)
    }

    /// Call the provider until it answers, the error is not retryable or
    /// attempts run out.
    pub async fn fetch(&self, request: &AnalysisRequest) -> Result<ProviderResponse, RequestError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                "calling provider {} (attempt {}/{})",
                self.provider.name(),
                attempt,
                self.retry.max_attempts
            );

            let err = match tokio::time::timeout(self.timeout, self.provider.analyze(request)).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => e,
                // The provider future is dropped here, cancelling the call.
                Err(_) => ProviderError::Timeout,
            };

            warn!("provider attempt {} failed: {}", attempt, err);

            if !err.is_retryable() {
                return Err(RequestError::Rejected(err));
            }
            if attempt >= self.retry.max_attempts {
                return Err(RequestError::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }

            tokio::time::sleep(self.retry.delay_after(attempt)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_linearly() {
        let policy = RetryPolicy::new(4, Duration::from_millis(250));
        assert_eq!(policy.delay_after(1), Duration::from_millis(250));
        assert_eq!(policy.delay_after(2), Duration::from_millis(500));
        assert_eq!(policy.delay_after(3), Duration::from_millis(750));
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(3, Duration::from_secs(u64::MAX));
        assert_eq!(policy.delay_after(1), Duration::from_secs(u64::MAX));
        assert_eq!(policy.delay_after(2), Duration::MAX);
    }

    #[test]
    fn test_zero_retries_still_makes_one_attempt() {
        let policy = RetryPolicy::from(&RetryConfig {
            max_retries: 0,
            retry_delay_ms: 10,
        });
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn test_request_error_messages() {
        let err = RequestError::Exhausted {
            attempts: 3,
            last: ProviderError::Status(503),
        };
        assert_eq!(
            err.to_string(),
            "analysis failed after 3 attempt(s): provider returned HTTP 503"
        );
        assert_eq!(err.attempts(), 3);
        assert_eq!(RequestError::Rejected(ProviderError::Unauthorized(401)).attempts(), 1);
    }
}
