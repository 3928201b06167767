//! Analysis providers.
//!
//! A provider takes a validated request and returns its raw JSON answer. The
//! dispatcher handles timeouts and retries; the normalizer maps the answer
//! into an [`AnalysisReport`](crate::findings::AnalysisReport). Two
//! providers ship:
//! - `sample`: in-process rule table with a simulated delay
//! - `http`: POSTs the request to a configured endpoint

mod http;
mod sample;

pub use http::HttpProvider;
pub use sample::SampleProvider;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::input::AnalysisRequest;

/// Raw provider answer, before normalization.
pub type ProviderResponse = serde_json::Value;

/// Errors a single provider call can fail with.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider rejected credentials (HTTP {0})")]
    Unauthorized(u16),
    #[error("provider rejected the request as invalid (HTTP {0})")]
    BadRequest(u16),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    InvalidBody(String),
    #[error("could not build request: {0}")]
    Build(String),
}

impl ProviderError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ProviderError::Unauthorized(_) | ProviderError::BadRequest(_) | ProviderError::Build(_)
        )
    }
}

/// Something that can analyze a request.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ProviderResponse, ProviderError>;

    fn name(&self) -> &str;
}

/// Which provider to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Sample,
    Http,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Sample => "sample",
            ProviderKind::Http => "http",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sample" | "mock" => Ok(ProviderKind::Sample),
            "http" => Ok(ProviderKind::Http),
            _ => Err(format!("unknown provider: {}", s)),
        }
    }
}

/// Build the provider selected by `kind` from the config.
pub fn build_provider(config: &Config, kind: ProviderKind) -> anyhow::Result<Arc<dyn AnalysisProvider>> {
    match kind {
        ProviderKind::Sample => Ok(Arc::new(SampleProvider::new(config.sample.delay_ms))),
        ProviderKind::Http => {
            let base_url = config
                .base_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("the http provider needs base_url in the config"))?;
            let provider = HttpProvider::new(base_url, config.api_key.clone(), config.timeout())?;
            Ok(Arc::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("sample".parse::<ProviderKind>(), Ok(ProviderKind::Sample));
        assert_eq!("mock".parse::<ProviderKind>(), Ok(ProviderKind::Sample));
        assert_eq!("HTTP".parse::<ProviderKind>(), Ok(ProviderKind::Http));
        assert!("grpc".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_http_provider_needs_base_url() {
        let config = Config::default();
        let err = build_provider(&config, ProviderKind::Http).err().unwrap();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_build_sample_provider() {
        let provider = build_provider(&Config::default(), ProviderKind::Sample).unwrap();
        assert_eq!(provider.name(), "sample");
    }

    #[test]
    fn test_unauthorized_is_not_retryable() {
        assert!(!ProviderError::Unauthorized(401).is_retryable());
        assert!(!ProviderError::BadRequest(422).is_retryable());
        assert!(!ProviderError::Build("bad url".to_string()).is_retryable());
        assert!(ProviderError::RateLimited.is_retryable());
        assert!(ProviderError::Status(503).is_retryable());
        assert!(ProviderError::Timeout.is_retryable());
    }
}
