//! The analysis pipeline: capture, dispatch, normalize.
//!
//! One analysis runs at a time. A trigger that arrives while another is
//! outstanding is rejected with [`PipelineError::Busy`] rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::dispatch::{Dispatcher, RequestError};
use crate::findings::AnalysisReport;
use crate::input::{capture, AnalysisRequest, RawInput, ValidationError};
use crate::provider::AnalysisProvider;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("an analysis is already in progress")]
    Busy,
}

/// A finished analysis: the request that was sent and its report.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub request: AnalysisRequest,
    pub report: AnalysisReport,
}

pub struct Pipeline {
    config: Config,
    dispatcher: Dispatcher,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Pipeline {
    pub fn new(config: Config, provider: Arc<dyn AnalysisProvider>) -> Self {
        let dispatcher = Dispatcher::from_config(provider, &config);
        Self {
            config,
            dispatcher,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.dispatcher.provider_name()
    }

    /// Whether an analysis is currently outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate the input, send it to the provider and normalize the answer.
    pub async fn run(&self, input: &RawInput<'_>) -> Result<Analysis, PipelineError> {
        let _guard = self.acquire()?;

        let request = capture(input, &self.config.analysis)?;
        let report = self.dispatcher.dispatch(&request).await?;

        Ok(Analysis { request, report })
    }

    fn acquire(&self) -> Result<InFlight<'_>, PipelineError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| PipelineError::Busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Violation;
    use crate::provider::SampleProvider;

    fn pipeline() -> Pipeline {
        Pipeline::new(Config::default(), Arc::new(SampleProvider::new(0)))
    }

    #[tokio::test]
    async fn test_validation_error_releases_guard() {
        let pipeline = pipeline();
        let input = RawInput {
            code: "   ",
            language: Some("javascript"),
            ..Default::default()
        };
        match pipeline.run(&input).await {
            Err(PipelineError::Invalid(e)) => assert_eq!(e.violations, vec![Violation::Empty]),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(!pipeline.is_busy());
    }

    #[tokio::test]
    async fn test_run_produces_report() {
        let pipeline = pipeline();
        let input = RawInput {
            code: "x = eval(input())",
            language: Some("python"),
            ..Default::default()
        };
        let analysis = pipeline.run(&input).await.unwrap();
        assert_eq!(analysis.report.security.len(), 1);
        assert!(!pipeline.is_busy());
    }

    #[test]
    fn test_second_acquire_is_busy() {
        let pipeline = pipeline();
        let first = pipeline.acquire().unwrap();
        assert!(pipeline.is_busy());
        assert!(matches!(pipeline.acquire(), Err(PipelineError::Busy)));
        drop(first);
        assert!(pipeline.acquire().is_ok());
    }
}
