//! codescope - code analysis front-end.
//!
//! codescope takes a piece of source code, validates it, sends it to an
//! analysis provider and renders the answer as a graded report of issues,
//! security findings and performance findings, with an optimized rewrite.
//!
//! # Architecture
//!
//! Data flows through explicit values, leaves first:
//!
//! - `input`: validates raw text and a language hint into an `AnalysisRequest`
//! - `dispatch`: sends a request to a provider with timeouts and retries
//! - `provider`: the `AnalysisProvider` trait and its sample/http variants
//! - `normalize`: maps any provider answer into an `AnalysisReport`
//! - `score`: derives the quality grade from finding counts
//! - `pipeline`: runs the steps above, one analysis at a time
//! - `report`: output formatting (pretty, JSON) and export
//!
//! # Adding a Provider
//!
//! Implement `AnalysisProvider` and add a `ProviderKind` variant in
//! `provider/mod.rs`. Nothing else needs to change.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod findings;
pub mod input;
pub mod language;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod score;

pub use config::Config;
pub use dispatch::{Dispatcher, RequestError, RetryPolicy};
pub use findings::{AnalysisReport, CheckCategory, Finding, Severity};
pub use input::{capture, AnalysisRequest, RawInput, ValidationError};
pub use language::Language;
pub use normalize::normalize;
pub use pipeline::{Analysis, Pipeline, PipelineError};
pub use provider::{AnalysisProvider, HttpProvider, ProviderError, ProviderKind, SampleProvider};
pub use score::QualityGrade;
